use anyhow::Result;
use dialoguer::Select;
use grid_export::wizard::ExportFormat;
use grid_export::wizard::view::{StepBody, StepView};

/// Button pressed in a wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Primary,
    Secondary,
    /// Pick a different output format before the download starts
    ChangeFormat,
    /// Escape pressed: close the wizard
    Dismiss,
}

const CHANGE_FORMAT: &str = "Change format";

/// Actions offered for a step, in display order.
///
/// A disabled primary button is left out.
fn step_actions(view: &StepView) -> Vec<(StepAction, &'static str)> {
    let mut actions = Vec::new();
    if !view.primary_disabled {
        actions.push((StepAction::Primary, view.primary_text));
    }
    if matches!(view.body, StepBody::FormatChoice { .. }) {
        actions.push((StepAction::ChangeFormat, CHANGE_FORMAT));
    }
    actions.push((StepAction::Secondary, view.secondary_text));
    actions
}

/// Offer the step's buttons as an arrow-key selection
pub fn prompt_step_action(view: &StepView) -> Result<StepAction> {
    let actions = step_actions(view);
    let items: Vec<&str> = actions.iter().map(|(_, label)| *label).collect();

    let selection = Select::new()
        .with_prompt("Choose an option (Esc to close)")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection
        .map(|index| actions[index].0)
        .unwrap_or(StepAction::Dismiss))
}

/// Ask for the output format. `None` when the user backs out.
pub fn prompt_format(
    legend: &str,
    options: &[(ExportFormat, &'static str)],
    selected: Option<ExportFormat>,
) -> Result<Option<ExportFormat>> {
    let labels: Vec<&str> = options.iter().map(|(_, label)| *label).collect();
    let default_index = selected
        .and_then(|format| options.iter().position(|(f, _)| *f == format))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt(legend)
        .items(&labels)
        .default(default_index)
        .interact_opt()?;

    Ok(selection.map(|index| options[index].0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_export::wizard::{ExportFormat, PreparationOrder, Wizard, Msg};

    fn labels(view: &StepView) -> Vec<&'static str> {
        step_actions(view).into_iter().map(|(_, label)| label).collect()
    }

    #[test]
    fn test_format_can_be_changed_after_choosing() {
        let mut wizard = Wizard::new("grid-1", PreparationOrder::AfterSave);
        wizard.update(Msg::Open);
        wizard.update(Msg::Secondary);
        wizard.update(Msg::SelectFormat(ExportFormat::Csv));

        let view = wizard.view().unwrap();
        assert_eq!(
            labels(&view),
            vec![view.primary_text, CHANGE_FORMAT, view.secondary_text]
        );
    }

    #[test]
    fn test_disabled_primary_is_not_offered() {
        let mut wizard = Wizard::new("grid-1", PreparationOrder::AfterSave);
        wizard.update(Msg::Open);
        wizard.update(Msg::Secondary);
        wizard.update(Msg::SelectFormat(ExportFormat::Xlsx));
        wizard.update(Msg::Primary);

        let view = wizard.view().unwrap();
        assert_eq!(
            step_actions(&view),
            vec![(StepAction::Secondary, view.secondary_text)]
        );
    }
}
