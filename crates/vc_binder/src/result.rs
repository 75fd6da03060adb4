use vc_access::Value;

/// The outcome of one bind: a value, or nothing.
///
/// A bound [`Value::Null`] is the same as no value at all, both are
/// [`empty`](Self::empty).
///
/// # Examples
///
/// ```
/// use vc_access::Value;
/// use vc_binder::BindResult;
///
/// assert!(BindResult::of(Value::from(1)).is_bound());
/// assert!(!BindResult::of(Value::Null).is_bound());
/// assert_eq!(BindResult::empty().or(Value::from(2)), Value::from(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindResult(Option<Value>);

impl BindResult {
    #[inline]
    pub fn of(value: Value) -> Self {
        Self((!value.is_null()).then_some(value))
    }

    #[inline]
    pub const fn empty() -> Self {
        Self(None)
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    #[inline]
    pub fn into_value(self) -> Option<Value> {
        self.0
    }

    /// The bound value, or `other`.
    #[inline]
    pub fn or(self, other: Value) -> Value {
        self.0.unwrap_or(other)
    }

    #[inline]
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        self.0.map_or(Self::empty(), |value| Self::of(f(value)))
    }
}

impl From<Option<Value>> for BindResult {
    #[inline]
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::empty(), Self::of)
    }
}

impl From<BindResult> for Option<Value> {
    #[inline]
    fn from(result: BindResult) -> Self {
        result.0
    }
}
