//! Request/response boundary to the process that owns the workspace.
//!
//! Every call is keyed by a command name and carries a map of named
//! arguments. The reply is a JSON value decoded into the caller's type, or
//! an error.

pub mod local;
pub mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Named arguments of a backend command.
pub type Args = serde_json::Map<String, Value>;

/// Builds an argument map from `(name, value)` pairs.
pub fn args<I, K>(pairs: I) -> Args
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Something that executes workspace commands.
pub trait Backend {
    /// Runs `command` with `args` and returns its raw result.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is unknown, an argument is missing or
    /// malformed, or the command itself fails.
    fn invoke(&self, command: &str, args: Args) -> Result<Value>;

    /// Runs `command` and decodes its result into `R`.
    fn invoke_as<R: DeserializeOwned>(&self, command: &str, args: Args) -> Result<R>
    where
        Self: Sized,
    {
        let value = self.invoke(command, args)?;
        serde_json::from_value(value)
            .with_context(|| format!("Failed to decode result of {command}"))
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn invoke(&self, command: &str, args: Args) -> Result<Value> {
        (**self).invoke(command, args)
    }
}

impl<B: Backend + ?Sized> Backend for &B {
    fn invoke(&self, command: &str, args: Args) -> Result<Value> {
        (**self).invoke(command, args)
    }
}

/// Reads a required argument and decodes it into `T`.
pub(crate) fn arg<T: DeserializeOwned>(args: &Args, name: &str) -> Result<T> {
    let value = args
        .get(name)
        .with_context(|| format!("Missing argument `{name}`"))?;
    serde_json::from_value(value.clone())
        .with_context(|| format!("Invalid argument `{name}`"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Echo;

    impl Backend for Echo {
        fn invoke(&self, command: &str, args: Args) -> Result<Value> {
            Ok(json!({ "command": command, "args": args }))
        }
    }

    #[test]
    fn test_args_builder() {
        let a = args([("topicId", json!("t1")), ("newIndex", json!(3))]);
        assert_eq!(a.len(), 2);
        assert_eq!(a["topicId"], "t1");
        assert_eq!(a["newIndex"], 3);
    }

    #[test]
    fn test_arg_decoding() {
        let a = args([("name", json!("Intro")), ("newIndex", json!(2))]);
        let name: String = arg(&a, "name").expect("name");
        let index: usize = arg(&a, "newIndex").expect("index");
        assert_eq!(name, "Intro");
        assert_eq!(index, 2);

        let missing = arg::<String>(&a, "sectionId").unwrap_err();
        assert!(missing.to_string().contains("sectionId"));

        let wrong = arg::<usize>(&a, "name").unwrap_err();
        assert!(wrong.to_string().contains("name"));
    }

    #[test]
    fn test_invoke_as_through_arc() {
        let backend = Arc::new(Echo);
        let value: Value = backend
            .invoke_as("get_platform", Args::new())
            .expect("invoke");
        assert_eq!(value["command"], "get_platform");
    }

    #[test]
    fn test_invoke_as_reports_decode_failure() {
        let err = Echo.invoke_as::<String>("get_platform", Args::new()).unwrap_err();
        assert!(err.to_string().contains("get_platform"));
    }
}
