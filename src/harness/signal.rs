use parking_lot::{Condvar, Mutex};

/// One-shot broadcast gate. Every waiter proceeds once `release` is called, including
/// waiters that only arrive afterwards.
#[derive(Debug, Default)]
pub struct StartSignal {
    released: Mutex<bool>,
    cond: Condvar,
}

impl StartSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(&self) {
        let mut released = self.released.lock();
        while !*released {
            self.cond.wait(&mut released);
        }
    }

    pub fn release(&self) {
        let mut released = self.released.lock();
        if !*released {
            *released = true;
            self.cond.notify_all();
        }
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        *self.released.lock()
    }
}
