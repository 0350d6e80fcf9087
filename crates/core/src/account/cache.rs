use crate::error::Result;

/// Lazily populated value owned by a session.
///
/// A cache is unloaded, loaded or invalidated. It is either fully loaded or
/// not loaded at all; a failed load leaves it untouched.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
    invalidated: bool,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            value: None,
            invalidated: false,
        }
    }
}

impl<T> Cached<T> {
    /// An empty cache; the first access fetches.
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// A cache already holding `value`.
    pub fn loaded(value: T) -> Self {
        Self {
            value: Some(value),
            invalidated: false,
        }
    }

    /// Return the value, running `load` first if it is not loaded.
    pub fn get_or_try_load(&mut self, load: impl FnOnce() -> Result<T>) -> Result<&mut T> {
        match self.value {
            Some(ref mut value) => Ok(value),
            None => {
                let value = load()?;
                self.invalidated = false;
                Ok(self.value.insert(value))
            }
        }
    }

    /// The value if loaded.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The value if loaded, mutably.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Whether a value is present.
    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// Whether nothing was fetched since creation or the last reset.
    pub fn is_unloaded(&self) -> bool {
        self.value.is_none() && !self.invalidated
    }

    /// Whether the value was explicitly marked stale.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Forget the value; the next access fetches again.
    pub fn reset(&mut self) {
        self.value = None;
        self.invalidated = false;
    }

    /// Mark the value stale; the next access fetches again.
    pub fn invalidate(&mut self) {
        self.value = None;
        self.invalidated = true;
    }
}
