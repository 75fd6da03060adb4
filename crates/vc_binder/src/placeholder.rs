use vc_access::Value;
use vc_path::Path;

use crate::{BindContext, BindError, BindHandler, BindResult, Bindable, NoopHandler};

/// Substitutes `${path}` and `${path:default}` in string values.
///
/// Referenced paths are read from the same source the bind reads from, and
/// their values are substituted recursively. Defaults may hold placeholders
/// too. A placeholder that refers back to itself fails with
/// [`BindError::CircularPlaceholder`].
///
/// Unresolvable placeholders without a default are left as written, unless
/// [`strict`](Self::strict) is set.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::Value;
/// use vc_binder::{Bindable, Binder};
/// use vc_types::{TypeFactory, TypeRegistry, builtin};
///
/// let factory = Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())));
/// let binder = Binder::new(factory.clone());
/// let source = Value::map([
///     ("host", Value::from("example.org")),
///     ("url", Value::from("https://${host}:${port:443}/")),
/// ]);
///
/// let url = binder.bind("url", &Bindable::of(factory.of_class(builtin::STRING)), &source).unwrap();
/// assert_eq!(url.into_value(), Some(Value::from("https://example.org:443/")));
/// ```
#[derive(Debug, Clone)]
pub struct PlaceholderHandler<H = NoopHandler> {
    inner: H,
    prefix: String,
    suffix: String,
    value_separator: char,
    strict: bool,
}

impl Default for PlaceholderHandler {
    #[inline]
    fn default() -> Self {
        Self::new(NoopHandler)
    }
}

impl<H: BindHandler> PlaceholderHandler<H> {
    /// Wraps `inner` with the `${` `}` syntax and `:` before defaults.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            prefix: "${".to_owned(),
            suffix: "}".to_owned(),
            value_separator: ':',
            strict: false,
        }
    }

    /// Changes the delimiters, e.g. `#{` and `}`.
    pub fn with_delimiters(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }

    #[inline]
    pub fn with_value_separator(mut self, separator: char) -> Self {
        self.value_separator = separator;
        self
    }

    /// Fails on placeholders that resolve to nothing and have no default.
    #[inline]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[inline]
    pub fn inner(&self) -> &H {
        &self.inner
    }

    /// Replaces every placeholder in `text`.
    pub fn resolve(&self, text: &str, ctx: &BindContext<'_>) -> Result<String, BindError> {
        let mut visiting = Vec::new();
        self.resolve_in(text, ctx, &mut visiting)
    }

    fn resolve_in(
        &self,
        text: &str,
        ctx: &BindContext<'_>,
        visiting: &mut Vec<String>,
    ) -> Result<String, BindError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(&self.prefix) {
            out.push_str(&rest[..start]);
            let body_start = start + self.prefix.len();
            let Some(body_len) = self.find_end(&rest[body_start..]) else {
                // Unterminated, the rest is plain text.
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let body = &rest[body_start..body_start + body_len];
            let body = self.resolve_in(body, ctx, visiting)?;
            let (key, default) = match body.split_once(self.value_separator) {
                Some((key, default)) => (key, Some(default)),
                None => (body.as_str(), None),
            };

            if visiting.iter().any(|k| k == key) {
                return Err(BindError::CircularPlaceholder(key.to_owned()));
            }
            visiting.push(key.to_owned());
            let found = ctx
                .read(&ctx.parse_path(key))?
                .and_then(|value| value.as_text().map(|text| text.into_owned()));
            let replacement = match (found, default) {
                (Some(found), _) => self.resolve_in(&found, ctx, visiting)?,
                (None, Some(default)) => self.resolve_in(default, ctx, visiting)?,
                (None, None) if self.strict => {
                    return Err(BindError::IllegalArgument(format!(
                        "could not resolve placeholder `{key}`"
                    )));
                }
                (None, None) => {
                    log::debug!("placeholder `{key}` is left unresolved");
                    format!("{}{body}{}", self.prefix, self.suffix)
                }
            };
            visiting.pop();

            out.push_str(&replacement);
            rest = &rest[body_start + body_len + self.suffix.len()..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Length of the placeholder body, up to its matching suffix.
    fn find_end(&self, text: &str) -> Option<usize> {
        let mut depth = 0usize;
        let mut index = 0;
        while index < text.len() {
            let rest = &text[index..];
            if rest.starts_with(&self.prefix) {
                depth += 1;
                index += self.prefix.len();
            } else if rest.starts_with(&self.suffix) {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
                index += self.suffix.len();
            } else {
                index += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        None
    }
}

impl<H: BindHandler> BindHandler for PlaceholderHandler<H> {
    #[inline]
    fn on_key_created(&self, path: Path, ctx: &BindContext<'_>) -> Path {
        self.inner.on_key_created(path, ctx)
    }

    fn on_binding(
        &self,
        path: &Path,
        target: &Bindable,
        ctx: &BindContext<'_>,
        value: Value,
    ) -> Result<Value, BindError> {
        let value = match value {
            Value::Str(text) if text.contains(self.prefix.as_str()) => {
                Value::Str(self.resolve(&text, ctx)?)
            }
            other => other,
        };
        self.inner.on_binding(path, target, ctx, value)
    }

    #[inline]
    fn on_bound(&self, path: &Path, target: &Bindable, ctx: &BindContext<'_>, value: &Value) {
        self.inner.on_bound(path, target, ctx, value);
    }

    #[inline]
    fn on_failure(
        &self,
        path: &Path,
        target: &Bindable,
        ctx: &BindContext<'_>,
        error: BindError,
    ) -> Result<BindResult, BindError> {
        self.inner.on_failure(path, target, ctx, error)
    }

    #[inline]
    fn on_unbound(&self, path: &Path, target: &Bindable, ctx: &BindContext<'_>) {
        self.inner.on_unbound(path, target, ctx);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_access::Value;
    use vc_types::{TypeFactory, TypeRegistry, builtin};

    use crate::{BindError, Bindable, Binder, NoopHandler, PlaceholderHandler};

    fn bind_string(
        binder: &Binder,
        path: &str,
        source: &Value,
    ) -> Result<Option<Value>, BindError> {
        let ty = binder.factory().of_class(builtin::STRING);
        binder
            .bind(path, &Bindable::of(ty), source)
            .map(|result| result.into_value())
    }

    fn factory() -> Arc<TypeFactory> {
        Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())))
    }

    #[test]
    fn nested_and_chained() {
        let binder = Binder::new(factory());
        let source = Value::map([
            ("env", Value::from("prod")),
            ("name", Value::from("app-${env}")),
            ("title", Value::from("${name} (${missing:${env}})")),
            ("port", Value::from(8080)),
            ("addr", Value::from("host:${port}")),
        ]);
        assert_eq!(
            bind_string(&binder, "title", &source).unwrap(),
            Some(Value::from("app-prod (prod)"))
        );
        assert_eq!(
            bind_string(&binder, "addr", &source).unwrap(),
            Some(Value::from("host:8080"))
        );
    }

    #[test]
    fn unresolved_and_unterminated() {
        let binder = Binder::new(factory());
        let source = Value::map([("a", Value::from("${nope} and ${open"))]);
        assert_eq!(
            bind_string(&binder, "a", &source).unwrap(),
            Some(Value::from("${nope} and ${open"))
        );

        let strict = Binder::builder(factory())
            .handler(PlaceholderHandler::new(NoopHandler).strict(true))
            .build();
        let err = bind_string(&strict, "a", &source).unwrap_err();
        assert!(matches!(err.root_cause(), BindError::IllegalArgument(_)));
    }

    #[test]
    fn circular_references() {
        let binder = Binder::new(factory());
        let source = Value::map([("a", Value::from("${b}")), ("b", Value::from("x${a}"))]);
        let err = bind_string(&binder, "a", &source).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            BindError::CircularPlaceholder(key) if key == "b" || key == "a"
        ));
    }

    #[test]
    fn custom_delimiters() {
        let binder = Binder::builder(factory())
            .handler(PlaceholderHandler::new(NoopHandler).with_delimiters("#{", "}"))
            .build();
        let source = Value::map([("a", Value::from("#{b}/${b}")), ("b", Value::from("B"))]);
        assert_eq!(
            bind_string(&binder, "a", &source).unwrap(),
            Some(Value::from("B/${b}"))
        );
    }
}
