use std::any::Any;

use host::Event;
use tokio::sync::oneshot;

/// A suspended strategy's resumption condition (spec.md §4.B): `matches`
/// is evaluated against every event until it returns `Some`, at which
/// point the boxed value is delivered through `resume` and the want is
/// cleared. Type-erased because different `yield_want` call sites want
/// different result types.
pub(crate) struct PendingWant {
    matches: Box<dyn Fn(&Event) -> Option<Box<dyn Any>>>,
    resume: oneshot::Sender<Box<dyn Any>>,
}

impl PendingWant {
    pub(crate) fn new<T: 'static>(
        want: impl Fn(&Event) -> Option<T> + 'static,
        resume: oneshot::Sender<Box<dyn Any>>,
    ) -> Self {
        let erased = move |ev: &Event| want(ev).map(|v| Box::new(v) as Box<dyn Any>);
        Self { matches: Box::new(erased), resume }
    }

    /// Tries the want against `event`. Returns `true` and consumes `self`
    /// by sending the matched value if it matched; the caller keeps `self`
    /// around (by not calling this in the first place) when it doesn't.
    pub(crate) fn try_resume(self, event: &Event) -> Result<(), Self> {
        match (self.matches)(event) {
            Some(value) => {
                let _ = self.resume.send(value);
                Ok(())
            }
            None => Err(self),
        }
    }
}
