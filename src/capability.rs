// Startup-time capability probing: a backend is either present for the process lifetime or not.

/// Result of a one-time backend probe. Never re-probed per call.
#[derive(Debug)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    /// Wraps a probe outcome, logging the degradation once when the backend is absent.
    pub fn from_probe<E: std::fmt::Display>(backend: &'static str, probe: Result<T, E>) -> Self {
        match probe {
            Ok(inner) => {
                tracing::debug!(backend, "backend available");
                Capability::Available(inner)
            }
            Err(e) => {
                tracing::info!(backend, reason = %e, "backend unavailable, reporting disabled");
                Capability::Unavailable
            }
        }
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Capability::Available(inner) => Some(inner),
            Capability::Unavailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Capability::Available(inner) => Capability::Available(f(inner)),
            Capability::Unavailable => Capability::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}
