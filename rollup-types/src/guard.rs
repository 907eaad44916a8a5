use std::sync::atomic::{AtomicBool, Ordering};

/// Rejects nested entry into guarded operations.
///
/// An operation enters the guard before touching state and holds the
/// returned [`Entered`] value until it is done, including any external
/// call it makes. Dropping the value releases the guard, so every exit
/// path, early error returns included, leaves it released.
#[derive(Debug, Default)]
pub struct ReentrancyGuard(AtomicBool);

/// Proof of having entered a [`ReentrancyGuard`].
#[derive(Debug)]
#[must_use]
pub struct Entered<'a>(&'a ReentrancyGuard);

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the guard, unless someone is already inside.
    pub fn enter(&self) -> Option<Entered<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Entered(self))
    }

    pub fn is_entered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.0.0.store(false, Ordering::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::ReentrancyGuard;

    #[test]
    fn nested_entry_is_rejected() {
        let g = ReentrancyGuard::new();
        let e = g.enter().unwrap();
        assert!(g.is_entered());
        assert!(g.enter().is_none());
        drop(e);
        assert!(!g.is_entered());
        assert!(g.enter().is_some());
    }

    #[test]
    fn released_on_early_return() {
        fn op(g: &ReentrancyGuard, fail: bool) -> Result<(), ()> {
            let _e = g.enter().ok_or(())?;
            if fail {
                return Err(());
            }
            Ok(())
        }
        let g = ReentrancyGuard::new();
        assert!(op(&g, true).is_err());
        assert!(!g.is_entered());
        assert!(op(&g, false).is_ok());
        assert!(!g.is_entered());
    }
}
