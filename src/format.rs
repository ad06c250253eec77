//! Positional interpolation of translation templates.
//!
//! Templates use composite-format placeholders:
//!
//! ```text
//! {index[,alignment][:format]}
//! ```
//!
//! `{{` and `}}` produce literal braces. Alignment pads to the given width,
//! right-aligned when positive and left-aligned when negative. Numeric format
//! specifiers are a letter with an optional precision:
//!
//! | Spec      | Arguments       | Output                           |
//! |-----------|-----------------|----------------------------------|
//! | `D[n]`    | integers        | zero padded to `n` digits        |
//! | `F[n]`    | numbers         | fixed point, `n` decimals (2)    |
//! | `N[n]`    | numbers         | grouped thousands, `n` decimals  |
//! | `P[n]`    | numbers         | percent, `n` decimals (2)        |
//! | `E[n]`    | numbers         | scientific, `n` decimals (6)     |
//! | `X[n]`    | integers        | hexadecimal, padded to `n`       |
//!
//! Interpolation never panics. [`interpolate`] reports failure through
//! [`Interpolated::Unformatted`], which carries the untouched template.

use std::fmt;

use thiserror::Error;

/// A positional argument for a template.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    /// Text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl FormatArg {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) | Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for FormatArg {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for FormatArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for FormatArg {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for FormatArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for FormatArg {
                fn from(value: $t) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64);
impl_from_int!(UInt, u64: u8, u16, u32, u64);

impl From<usize> for FormatArg {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

/// Why a template could not be interpolated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A `{` without a closing `}`, or a lone `}`.
    #[error("unbalanced brace at byte {position}")]
    UnbalancedBrace {
        /// Byte offset in the template.
        position: usize,
    },

    /// Placeholder content that is not `index[,alignment][:format]`.
    #[error("malformed placeholder '{{{placeholder}}}'")]
    MalformedPlaceholder {
        /// The text between the braces.
        placeholder: String,
    },

    /// A placeholder refers past the end of the argument list.
    #[error("placeholder {index} but only {count} argument(s)")]
    MissingArgument {
        /// Requested index.
        index: usize,
        /// Number of arguments supplied.
        count: usize,
    },

    /// A format specifier that does not apply to the argument's type.
    #[error("format '{spec}' cannot be applied to {kind} argument {index}")]
    TypeMismatch {
        /// Argument index.
        index: usize,
        /// The format specifier.
        spec: String,
        /// The argument's type.
        kind: &'static str,
    },

    /// An unknown format specifier.
    #[error("unknown format specifier '{spec}'")]
    UnknownSpecifier {
        /// The format specifier.
        spec: String,
    },
}

/// Outcome of a best-effort interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpolated<'a> {
    /// All placeholders were substituted.
    Formatted(String),
    /// Interpolation failed; the template is returned as stored.
    Unformatted {
        /// The untouched template.
        template: &'a str,
        /// What went wrong.
        error: FormatError,
    },
}

impl Interpolated<'_> {
    /// Whether interpolation succeeded.
    pub const fn is_formatted(&self) -> bool {
        matches!(self, Self::Formatted(_))
    }

    /// The resulting text: formatted output, or the template on failure.
    pub fn into_string(self) -> String {
        match self {
            Self::Formatted(s) => s,
            Self::Unformatted { template, .. } => template.to_string(),
        }
    }
}

/// Interpolate `args` into `template`, falling back to the template itself.
pub fn interpolate<'a>(template: &'a str, args: &[FormatArg]) -> Interpolated<'a> {
    match format_template(template, args) {
        Ok(formatted) => Interpolated::Formatted(formatted),
        Err(error) => Interpolated::Unformatted { template, error },
    }
}

/// Interpolate `args` into `template`.
pub fn format_template(template: &str, args: &[FormatArg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let start = position + 1;
                let end = loop {
                    match chars.next() {
                        Some((i, '}')) => break i,
                        Some((_, '{')) | None => return Err(FormatError::UnbalancedBrace { position }),
                        Some(_) => {}
                    }
                };

                let placeholder = Placeholder::parse(&template[start..end])?;
                let arg = args.get(placeholder.index).ok_or(FormatError::MissingArgument {
                    index: placeholder.index,
                    count: args.len(),
                })?;
                let rendered = render(placeholder.index, arg, placeholder.spec)?;
                pad_into(&mut out, &rendered, placeholder.alignment);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_some() {
                    out.push('}');
                } else {
                    return Err(FormatError::UnbalancedBrace { position });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

struct Placeholder<'t> {
    index: usize,
    alignment: i64,
    spec: Option<&'t str>,
}

impl<'t> Placeholder<'t> {
    fn parse(content: &'t str) -> Result<Self, FormatError> {
        let malformed = || FormatError::MalformedPlaceholder { placeholder: content.to_string() };

        let (head, spec) = match content.split_once(':') {
            Some((head, spec)) => (head, Some(spec)),
            None => (content, None),
        };
        let (index, alignment) = match head.split_once(',') {
            Some((index, alignment)) => (index, Some(alignment)),
            None => (head, None),
        };

        let index = index.trim();
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index = index.parse().map_err(|_| malformed())?;
        let alignment = match alignment {
            Some(a) => a.trim().parse().map_err(|_| malformed())?,
            None => 0,
        };

        Ok(Self { index, alignment, spec })
    }
}

fn render(index: usize, arg: &FormatArg, spec: Option<&str>) -> Result<String, FormatError> {
    let Some(spec) = spec.filter(|s| !s.is_empty()) else {
        return Ok(arg.to_string());
    };

    let mismatch = || FormatError::TypeMismatch { index, spec: spec.to_string(), kind: arg.kind() };
    let unknown = || FormatError::UnknownSpecifier { spec: spec.to_string() };

    let mut letters = spec.chars();
    let letter = letters.next().ok_or_else(unknown)?;
    let precision = letters.as_str();
    let precision: Option<usize> = if precision.is_empty() {
        None
    } else {
        Some(precision.parse().map_err(|_| unknown())?)
    };

    match letter {
        'D' | 'd' => {
            let width = precision.unwrap_or(0);
            match arg {
                FormatArg::Int(v) if *v < 0 => Ok(format!("-{:0width$}", v.unsigned_abs())),
                FormatArg::Int(v) => Ok(format!("{v:0width$}")),
                FormatArg::UInt(v) => Ok(format!("{v:0width$}")),
                _ => Err(mismatch()),
            }
        }
        'X' | 'x' => {
            let width = precision.unwrap_or(0);
            let hex = match arg {
                FormatArg::Int(v) => format!("{v:0width$X}"),
                FormatArg::UInt(v) => format!("{v:0width$X}"),
                _ => return Err(mismatch()),
            };
            Ok(if letter == 'x' { hex.to_ascii_lowercase() } else { hex })
        }
        'F' | 'f' => {
            let value = arg.as_f64().ok_or_else(mismatch)?;
            Ok(format!("{:.*}", precision.unwrap_or(2), value))
        }
        'N' | 'n' => {
            let value = arg.as_f64().ok_or_else(mismatch)?;
            Ok(group_thousands(&format!("{:.*}", precision.unwrap_or(2), value)))
        }
        'P' | 'p' => {
            let value = arg.as_f64().ok_or_else(mismatch)?;
            Ok(format!("{:.*}%", precision.unwrap_or(2), value * 100.0))
        }
        'E' | 'e' => {
            let value = arg.as_f64().ok_or_else(mismatch)?;
            let sci = format!("{:.*e}", precision.unwrap_or(6), value);
            Ok(if letter == 'E' { sci.to_ascii_uppercase() } else { sci })
        }
        _ => Err(unknown()),
    }
}

/// Insert `,` separators into the integer part of a formatted number.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    grouped.push_str(sign);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn pad_into(out: &mut String, rendered: &str, alignment: i64) {
    let width = alignment.unsigned_abs() as usize;
    let len = rendered.chars().count();
    let padding = width.saturating_sub(len);

    if alignment > 0 {
        out.extend(std::iter::repeat_n(' ', padding));
        out.push_str(rendered);
    } else {
        out.push_str(rendered);
        out.extend(std::iter::repeat_n(' ', padding));
    }
}
