//! The three-valued `Form` algebra.
//!
//! A `Form` is a truth value with an explicit third state: `Mark`
//! (affirmed), `Void` (denied), and `Imaginary` (irreducibly uncertain).
//! Imaginary is "radioactive" — it contaminates any binary combination not
//! already dominated by Void (in `and`) or Mark (in `or`), so "don't know"
//! propagates instead of being silently resolved.

use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

/// Weight share a side must clear in [`Form::superposition`] to win.
const SUPERPOSITION_DOMINANCE: f64 = 0.6;

/// A three-valued truth value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Form {
    /// Affirmed — certainly true.
    Mark,
    /// Denied — certainly false.
    Void,
    /// Undecidable — uncertainty that must propagate, not resolve.
    Imaginary,
}

impl Form {
    /// Human-readable name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Form::Mark => "Mark",
            Form::Void => "Void",
            Form::Imaginary => "Imaginary",
        }
    }

    /// One-character symbol used in audit records.
    pub fn symbol(&self) -> char {
        match self {
            Form::Mark => '✓',
            Form::Void => '✗',
            Form::Imaginary => '?',
        }
    }

    /// Whether this is `Mark`.
    pub fn is_mark(&self) -> bool {
        matches!(self, Form::Mark)
    }

    /// Whether this is `Void`.
    pub fn is_void(&self) -> bool {
        matches!(self, Form::Void)
    }

    /// Whether this is `Imaginary`.
    pub fn is_imaginary(&self) -> bool {
        matches!(self, Form::Imaginary)
    }

    /// Conjunction over any number of forms.
    ///
    /// Mark if empty or all Mark; Void if **any** Void (an explicit denial
    /// always wins, even over Imaginary); else Imaginary.
    pub fn all<I>(forms: I) -> Form
    where
        I: IntoIterator<Item = Form>,
    {
        let mut saw_imaginary = false;
        for form in forms {
            match form {
                Form::Void => return Form::Void,
                Form::Imaginary => saw_imaginary = true,
                Form::Mark => {}
            }
        }
        if saw_imaginary {
            Form::Imaginary
        } else {
            Form::Mark
        }
    }

    /// Disjunction over any number of forms — the dual of [`Form::all`].
    ///
    /// Void if empty or all Void; Mark if any Mark; else Imaginary.
    pub fn any<I>(forms: I) -> Form
    where
        I: IntoIterator<Item = Form>,
    {
        let mut saw_imaginary = false;
        for form in forms {
            match form {
                Form::Mark => return Form::Mark,
                Form::Imaginary => saw_imaginary = true,
                Form::Void => {}
            }
        }
        if saw_imaginary {
            Form::Imaginary
        } else {
            Form::Void
        }
    }

    /// Convert a confidence score into a form using two thresholds.
    ///
    /// `≥ high` → Mark, `≤ low` → Void, anything between → Imaginary.
    pub fn from_confidence(confidence: f64, high: f64, low: f64) -> Form {
        if confidence >= high {
            Form::Mark
        } else if confidence <= low {
            Form::Void
        } else {
            Form::Imaginary
        }
    }

    /// Convert presence into a form: `Some` → Mark, `None` → Void.
    pub fn from_presence<T>(value: Option<&T>) -> Form {
        match value {
            Some(_) => Form::Mark,
            None => Form::Void,
        }
    }

    /// Resolve weighted opinions into one form.
    ///
    /// Sums weight per Mark/Void side. Returns Imaginary if any raw
    /// Imaginary vote is present, if the input carries no weight, or if the
    /// dominant side does not clear 60% of total weight; otherwise the
    /// dominant side.
    pub fn superposition(opinions: &[(Form, f64)]) -> Form {
        let mut mark_weight = 0.0;
        let mut void_weight = 0.0;
        for (form, weight) in opinions {
            match form {
                Form::Mark => mark_weight += weight.max(0.0),
                Form::Void => void_weight += weight.max(0.0),
                Form::Imaginary => return Form::Imaginary,
            }
        }
        let total = mark_weight + void_weight;
        if total <= 0.0 {
            return Form::Imaginary;
        }
        if mark_weight / total >= SUPERPOSITION_DOMINANCE {
            Form::Mark
        } else if void_weight / total >= SUPERPOSITION_DOMINANCE {
            Form::Void
        } else {
            Form::Imaginary
        }
    }

    /// Collapse into a result.
    ///
    /// Mark carries the value; Void carries the given error; Imaginary is a
    /// distinct failure so "don't know" is never mistaken for "no".
    pub fn to_result<T>(self, value: T, err: impl Into<String>) -> Result<T, String> {
        match self {
            Form::Mark => Ok(value),
            Form::Void => Err(err.into()),
            Form::Imaginary => Err(format!("Uncertain state: {}", err.into())),
        }
    }

    /// Collapse into an option: only Mark carries the value.
    pub fn to_option<T>(self, value: T) -> Option<T> {
        match self {
            Form::Mark => Some(value),
            _ => None,
        }
    }
}

impl Not for Form {
    type Output = Form;

    /// Negation: Mark ↔ Void; Imaginary is a fixed point.
    fn not(self) -> Form {
        match self {
            Form::Mark => Form::Void,
            Form::Void => Form::Mark,
            Form::Imaginary => Form::Imaginary,
        }
    }
}

impl BitAnd for Form {
    type Output = Form;

    fn bitand(self, rhs: Form) -> Form {
        match (self, rhs) {
            (Form::Void, _) | (_, Form::Void) => Form::Void,
            (Form::Imaginary, _) | (_, Form::Imaginary) => Form::Imaginary,
            (Form::Mark, Form::Mark) => Form::Mark,
        }
    }
}

impl BitOr for Form {
    type Output = Form;

    fn bitor(self, rhs: Form) -> Form {
        match (self, rhs) {
            (Form::Mark, _) | (_, Form::Mark) => Form::Mark,
            (Form::Imaginary, _) | (_, Form::Imaginary) => Form::Imaginary,
            (Form::Void, Form::Void) => Form::Void,
        }
    }
}

impl From<bool> for Form {
    fn from(value: bool) -> Form {
        if value {
            Form::Mark
        } else {
            Form::Void
        }
    }
}

impl std::fmt::Display for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
