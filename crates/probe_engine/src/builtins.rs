//! Capabilities every runner registers: `console` and `refresh`.

use probe_foundation::{HostObject, Value};

use crate::log::{LogLevel, LogQueue};

/// Builds the `console` object whose methods append to `queue`.
///
/// Arguments are rendered and joined with spaces, as a console prints them.
#[must_use]
pub fn console(queue: &LogQueue) -> Value {
    let mut console = HostObject::new("Console");
    for level in [LogLevel::Log, LogLevel::Warn, LogLevel::Error] {
        let queue = queue.clone();
        console = console.with_fn(level.as_str(), move |args| {
            queue.push(level, render(&args));
            Ok(Value::Undefined)
        });
    }
    Value::object(console)
}

/// Builds `refresh`, a no-op that hosts use to re-query their snapshot.
#[must_use]
pub fn refresh() -> Value {
    Value::function("refresh", |_| Ok(Value::Undefined))
}

/// The built-in capabilities, keyed by name.
#[must_use]
pub fn builtins(queue: &LogQueue) -> Vec<(&'static str, Value)> {
    vec![("console", console(queue)), ("refresh", refresh())]
}

fn render(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use probe_foundation::Capability;

    use super::*;

    #[tokio::test]
    async fn console_methods_append() {
        let queue = LogQueue::new();
        let console = console(&queue);
        for (method, level) in [
            ("log", LogLevel::Log),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            let function = console.member(method).unwrap();
            let host = function.as_host().unwrap();
            host.invoke(vec![Value::from(method), Value::from(1)])
                .await
                .unwrap();
            let last = queue.snapshot().pop().unwrap();
            assert_eq!(last.level, level);
            assert_eq!(last.message, format!("{method} 1"));
        }
    }

    #[test]
    fn builtins_names() {
        let names: Vec<_> = builtins(&LogQueue::new())
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["console", "refresh"]);
    }

    #[test]
    fn refresh_is_callable() {
        assert!(refresh().is_callable());
    }
}
