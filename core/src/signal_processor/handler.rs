use super::GameSignal;

/// Receives signals after each processed batch.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &GameSignal);

    fn handle_signals(&mut self, signals: &[GameSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}

/// Closures work as handlers for one-off registrations.
impl<F> SignalHandler for F
where
    F: FnMut(&GameSignal),
{
    fn handle_signal(&mut self, signal: &GameSignal) {
        self(signal)
    }
}
