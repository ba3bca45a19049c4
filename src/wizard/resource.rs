/// State of one asynchronous side effect started by the wizard.
///
/// Follows the RemoteData shape: nothing asked yet, in flight, finished, or
/// failed with a displayable message. Replaces `started: bool` plus
/// `result: Option<T>` pairs that can drift out of sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    /// Not requested in this session
    NotAsked,

    /// Request is in flight
    Loading,

    /// Request finished
    Success(T),

    /// Request failed
    Failure(E),
}

impl<T, E> Resource<T, E> {
    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    /// The error, if the request failed
    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::NotAsked
    }
}

/// One-shot hand-off of the prepared download to the export step.
///
/// Only `Awaiting -> Delivered` starts an export, so a result that resolves
/// twice cannot export twice.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Delivery {
    #[default]
    NotRequested,
    Awaiting,
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Delivery::Awaiting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_exposes_error() {
        let failed: Resource<u32> = Resource::Failure("boom".to_string());
        assert!(failed.is_failure());
        assert_eq!(failed.error().map(String::as_str), Some("boom"));
        assert_eq!(Resource::<u32>::Success(3).error(), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Resource::<()>::default(), Resource::NotAsked);
        assert_eq!(Delivery::default(), Delivery::NotRequested);
        assert!(!Delivery::Delivered.is_awaiting());
    }
}
