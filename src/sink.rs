//! Consumers of decoded messages and link state changes

use hud_link_shared::HudMessage;
use tracing::info;

/// Receives decoded messages from the phone
pub trait SensorSink: Send + Sync {
    /// Show only these sensors, in this order
    fn apply_filter(&self, names: &[String]);

    /// Record a sensor reading
    fn sensor_reading(&self, name: &str, value1: &str, value2: &str);
}

/// Observer for connect/disconnect transitions
pub trait LinkListener: Send + Sync {
    fn on_connection_state_changed(&self, connected: bool);
}

/// Hand a decoded message to the matching sink method
pub fn dispatch(sink: &dyn SensorSink, message: &HudMessage) {
    match message {
        HudMessage::FilterCommand { names } => sink.apply_filter(names),
        HudMessage::SensorReading {
            name,
            value1,
            value2,
        } => sink.sensor_reading(name, value1, value2),
    }
}

/// Sink that reports messages through tracing
#[derive(Debug, Default)]
pub struct LogSink;

impl SensorSink for LogSink {
    fn apply_filter(&self, names: &[String]) {
        info!("[HUD] Display filter: {:?}", names);
    }

    fn sensor_reading(&self, name: &str, value1: &str, value2: &str) {
        info!("[HUD] {} = {} {}", name, value1, value2);
    }
}

/// Listener that reports link transitions through tracing
#[derive(Debug, Default)]
pub struct LogListener;

impl LinkListener for LogListener {
    fn on_connection_state_changed(&self, connected: bool) {
        if connected {
            info!("[HUD] Phone link up");
        } else {
            info!("[HUD] Phone link down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }

    impl SensorSink for RecordingSink {
        fn apply_filter(&self, names: &[String]) {
            self.calls.lock().unwrap().push(format!("filter {:?}", names));
        }

        fn sensor_reading(&self, name: &str, value1: &str, value2: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("reading {name} {value1} {value2}"));
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let sink = RecordingSink::default();
        dispatch(
            &sink,
            &HudMessage::FilterCommand {
                names: vec!["a".into(), "b".into()],
            },
        );
        dispatch(
            &sink,
            &HudMessage::SensorReading {
                name: "speed".into(),
                value1: "12".into(),
                value2: "km/h".into(),
            },
        );

        let calls = sink.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "filter [\"a\", \"b\"]".to_string(),
                "reading speed 12 km/h".to_string()
            ]
        );
    }
}
