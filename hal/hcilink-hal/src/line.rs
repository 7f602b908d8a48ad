//! Data-ready notification line
//!
//! The controller raises a line when it has data. Its interrupt handler may
//! only signal the reader task; everything that touches the packet pool or
//! receive queue runs with this line's interrupt suppressed.

/// Interrupt control for the controller's data-ready line
///
/// Methods take `&self` because they are called from task context while
/// the interrupt handler may be live. Implementations typically mask and
/// unmask a single NVIC/EXTI line.
pub trait NotificationLine {
    /// Stop delivering data-ready interrupts
    fn suppress(&self);

    /// Resume delivering data-ready interrupts
    ///
    /// A level-triggered line that stayed asserted while suppressed fires
    /// again once restored.
    fn restore(&self);

    /// Suppress notifications until the returned guard is dropped
    fn masked(&self) -> Masked<'_, Self> {
        self.suppress();
        Masked { line: self }
    }
}

impl<L: NotificationLine + ?Sized> NotificationLine for &L {
    fn suppress(&self) {
        L::suppress(self)
    }

    fn restore(&self) {
        L::restore(self)
    }
}

/// Guard returned by [`NotificationLine::masked`]
///
/// Restores the line when dropped, so early returns cannot leave the
/// interrupt masked.
#[must_use = "notifications are restored as soon as the guard is dropped"]
pub struct Masked<'a, L: NotificationLine + ?Sized> {
    line: &'a L,
}

impl<L: NotificationLine + ?Sized> Drop for Masked<'_, L> {
    fn drop(&mut self) {
        self.line.restore();
    }
}
