use vc_access::{EnumValue, Value};
use vc_types::{ClassKind, ScalarKind, TypeExpression, TypeFactory, TypeKind};

use crate::ConversionError;

// -----------------------------------------------------------------------------
// ConversionService

/// Coerces a scalar read from the source into the target type.
///
/// Binders only hand scalars to a conversion service. Map keys are always
/// handed over as strings.
pub trait ConversionService: Send + Sync {
    fn convert(
        &self,
        factory: &TypeFactory,
        value: Value,
        target: &TypeExpression,
    ) -> Result<Value, ConversionError>;
}

// -----------------------------------------------------------------------------
// DefaultConversionService

/// Converts between the builtin scalar kinds, enums and class literals.
///
/// - integers are range checked; floats convert to integers only when they
///   have no fractional part
/// - `bool` accepts `true/false`, `yes/no`, `on/off` and `1/0`
/// - enums match the variant name exactly first, then ignoring case
/// - class literals are looked up by registered name
/// - targets that do not resolve, and `Object`, take the value as is
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::Value;
/// use vc_binder::{ConversionService, DefaultConversionService};
/// use vc_types::{TypeFactory, TypeRegistry, builtin};
///
/// let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
/// let service = DefaultConversionService;
///
/// let port = service.convert(&factory, Value::from("8080"), &factory.of_class(builtin::U16));
/// assert_eq!(port, Ok(Value::from(8080)));
///
/// let flag = service.convert(&factory, Value::from("ON"), &factory.of_class(builtin::BOOL));
/// assert_eq!(flag, Ok(Value::from(true)));
///
/// let small = service.convert(&factory, Value::from(300), &factory.of_class(builtin::U8));
/// assert!(small.is_err());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConversionService;

impl ConversionService for DefaultConversionService {
    fn convert(
        &self,
        factory: &TypeFactory,
        value: Value,
        target: &TypeExpression,
    ) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(value);
        }
        match factory.kind(target) {
            TypeKind::Scalar(kind) => convert_scalar(factory, value, kind),
            TypeKind::Enum => convert_enum(factory, value, target),
            TypeKind::Unknown => Ok(value),
            _ if value.is_instance_of(factory, target) => Ok(value),
            _ => Err(ConversionError::Unsupported {
                from: value.type_name(),
                to: factory.display(target),
            }),
        }
    }
}

fn invalid(value: &Value, kind: ScalarKind) -> ConversionError {
    ConversionError::Invalid {
        value: value.to_string(),
        to: kind.name().to_owned(),
    }
}

fn convert_scalar(
    factory: &TypeFactory,
    value: Value,
    kind: ScalarKind,
) -> Result<Value, ConversionError> {
    if value.fits_scalar(kind) && !kind.is_float() {
        return Ok(value);
    }
    match kind {
        ScalarKind::Bool => match &value {
            Value::Str(s) => parse_bool(s.trim())
                .map(Value::Bool)
                .ok_or_else(|| invalid(&value, kind)),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            _ => Err(invalid(&value, kind)),
        },
        ScalarKind::Char => {
            let text = value.as_text().ok_or_else(|| invalid(&value, kind))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(invalid(&value, kind)),
            }
        }
        ScalarKind::String => match &value {
            Value::Class(id) => Ok(Value::Str(factory.registry().name_of(*id).to_owned())),
            _ => value
                .as_text()
                .map(|text| Value::Str(text.into_owned()))
                .ok_or_else(|| invalid(&value, kind)),
        },
        ScalarKind::Class => {
            let text = value.as_text().ok_or_else(|| invalid(&value, kind))?;
            factory
                .registry()
                .lookup(text.trim())
                .map(Value::Class)
                .ok_or_else(|| ConversionError::UnknownClass(text.into_owned()))
        }
        ScalarKind::F32 | ScalarKind::F64 => {
            let float = match &value {
                Value::Str(s) => s.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            }
            .ok_or_else(|| invalid(&value, kind))?;
            Ok(match kind {
                ScalarKind::F32 => Value::Float(float as f32 as f64),
                _ => Value::Float(float),
            })
        }
        _ => convert_integer(value, kind),
    }
}

fn convert_integer(value: Value, kind: ScalarKind) -> Result<Value, ConversionError> {
    let integer = match &value {
        Value::Str(s) => s.trim().parse::<i128>().ok(),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i128),
        other => other.as_i128(),
    }
    .ok_or_else(|| invalid(&value, kind))?;

    let Some((min, max)) = kind.integer_range() else {
        return Err(invalid(&value, kind));
    };
    if !(min..=max).contains(&integer) {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            to: kind.name().to_owned(),
        });
    }
    Ok(match i64::try_from(integer) {
        Ok(i) => Value::Int(i),
        Err(_) => Value::UInt(integer as u64),
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["true", "yes", "on", "1"];
    const FALSE: [&str; 4] = ["false", "no", "off", "0"];
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(text)) {
        Some(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(text)) {
        Some(false)
    } else {
        None
    }
}

fn convert_enum(
    factory: &TypeFactory,
    value: Value,
    target: &TypeExpression,
) -> Result<Value, ConversionError> {
    let Some(info) = factory
        .raw_class(target)
        .and_then(|id| factory.registry().class(id))
        .filter(|info| info.kind() == ClassKind::Enum)
    else {
        return Err(ConversionError::Unsupported {
            from: value.type_name(),
            to: factory.display(target),
        });
    };
    if let Value::Enum(e) = &value
        && e.class() == info.id()
    {
        return Ok(value);
    }
    let unknown = || ConversionError::UnknownVariant {
        value: value.to_string(),
        to: info.name().to_owned(),
    };
    let text = value.as_text().ok_or_else(unknown)?;
    let text = text.trim();
    let variants = info.variants();
    variants
        .iter()
        .find(|v| *v == text)
        .or_else(|| variants.iter().find(|v| v.eq_ignore_ascii_case(text)))
        .map(|v| Value::Enum(EnumValue::new(info.id(), v.as_str())))
        .ok_or_else(unknown)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_access::Value;
    use vc_types::{ClassBuilder, TypeFactory, TypeRegistry, builtin};

    use crate::{ConversionError, ConversionService, DefaultConversionService};

    fn factory() -> (TypeFactory, vc_types::ClassId) {
        let mut registry = TypeRegistry::new();
        let color = registry
            .register(ClassBuilder::enumeration("Color", ["Red", "GREEN"]))
            .unwrap();
        (TypeFactory::new(Arc::new(registry)), color)
    }

    fn convert(
        factory: &TypeFactory,
        value: Value,
        class: vc_types::ClassId,
    ) -> Result<Value, ConversionError> {
        DefaultConversionService.convert(factory, value, &factory.of_class(class))
    }

    #[test]
    fn integers() {
        let (f, _) = factory();
        assert_eq!(convert(&f, " 42 ".into(), builtin::I32), Ok(Value::from(42)));
        assert_eq!(convert(&f, 3.0.into(), builtin::I64), Ok(Value::from(3)));
        assert!(convert(&f, 3.5.into(), builtin::I64).is_err());
        assert_eq!(
            convert(&f, "18446744073709551615".into(), builtin::U64),
            Ok(Value::UInt(u64::MAX))
        );
        assert!(matches!(
            convert(&f, "-1".into(), builtin::U32),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert(&f, "x".into(), builtin::I8),
            Err(ConversionError::Invalid { .. })
        ));
    }

    #[test]
    fn floats_and_text() {
        let (f, _) = factory();
        assert_eq!(convert(&f, "1.5".into(), builtin::F64), Ok(Value::from(1.5)));
        assert_eq!(convert(&f, 2.into(), builtin::F32), Ok(Value::from(2.0)));
        assert_eq!(convert(&f, 2.into(), builtin::STRING), Ok(Value::from("2")));
        assert_eq!(convert(&f, "y".into(), builtin::CHAR), Ok(Value::from('y')));
        assert!(convert(&f, "yy".into(), builtin::CHAR).is_err());
        assert_eq!(convert(&f, "No".into(), builtin::BOOL), Ok(Value::from(false)));
    }

    #[test]
    fn enums() {
        let (f, color) = factory();
        assert_eq!(
            convert(&f, "Red".into(), color),
            Ok(Value::enumeration(color, "Red"))
        );
        assert_eq!(
            convert(&f, "green".into(), color),
            Ok(Value::enumeration(color, "GREEN"))
        );
        assert!(matches!(
            convert(&f, "blue".into(), color),
            Err(ConversionError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn class_literals_and_objects() {
        let (f, color) = factory();
        assert_eq!(convert(&f, "Color".into(), builtin::CLASS), Ok(Value::Class(color)));
        assert_eq!(
            convert(&f, "Nope".into(), builtin::CLASS),
            Err(ConversionError::UnknownClass("Nope".into()))
        );
        assert_eq!(convert(&f, Value::Class(color), builtin::STRING), Ok(Value::from("Color")));
        assert_eq!(convert(&f, "x".into(), builtin::OBJECT), Ok(Value::from("x")));
    }
}
