// Own test binary: the process-wide OpenSSL setup here starts from an
// explicit, non-default configuration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use osslinit_core::{InitOptions, InitState};
use osslinit_openssl::{init, init_with, probe_der_certificate, state};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn default_entry_points_respect_earlier_configuration() {
    let configured = init_with(InitOptions::default().with_max_lock_slots(64).unwrap());
    assert_eq!(state(), InitState::Done);

    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));

    tracing::subscriber::with_default(subscriber, || {
        for _ in 0..3 {
            assert!(probe_der_certificate(b"junk").is_err());
        }
        assert!(std::ptr::eq(init(), configured));
    });

    assert_eq!(warnings.load(Ordering::SeqCst), 0);

    // An explicit request for different options is still reported.
    let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
    tracing::subscriber::with_default(subscriber, || {
        init_with(InitOptions::default());
    });
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}
