// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Pluggable objective-function parts plus the reference exponential
//! specification.

use crate::model::Model;

/// The transient per-call bundle handed to an objective part: model
/// parameters plus the current state and control.
pub struct ObjectiveVars<'a> {
    pub model: &'a Model,
    pub x: f64,
    pub r: f64,
    pub q: f64,
    pub s: f64,
}

/// One of the four pluggable functional parts of the objective. Variants
/// stand in for the reference implementation's function pointers; only
/// the label is ever persisted, never the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectivePart {
    Util,
    Cost,
    RadiusTransition,
    WealthTransition,
}

impl ObjectivePart {
    /// Text label saved alongside the model, matching the reference's
    /// `CCM_STRINGIFY` macro names.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectivePart::Util => "_util_",
            ObjectivePart::Cost => "_cost_",
            ObjectivePart::RadiusTransition => "_radt_",
            ObjectivePart::WealthTransition => "_wltt_",
        }
    }

    pub fn from_label(label: &str) -> Option<ObjectivePart> {
        match label {
            "_util_" => Some(ObjectivePart::Util),
            "_cost_" => Some(ObjectivePart::Cost),
            "_radt_" => Some(ObjectivePart::RadiusTransition),
            "_wltt_" => Some(ObjectivePart::WealthTransition),
            _ => None,
        }
    }

    pub fn evaluate(&self, v: &ObjectiveVars) -> f64 {
        match self {
            ObjectivePart::Util => exponential::util(v),
            ObjectivePart::Cost => exponential::cost(v),
            ObjectivePart::RadiusTransition => exponential::radt(v),
            ObjectivePart::WealthTransition => exponential::wltt(v),
        }
    }
}

/// The reference exponential functional specification.
pub mod exponential {
    use super::ObjectiveVars;

    /// `r' = 1 - (1 - delta*r) * e^{-s}`
    pub fn radt(v: &ObjectiveVars) -> f64 {
        1.0 - (1.0 - v.model.delta * v.r) * (-v.s).exp()
    }

    /// `u = r' * (1 - e^{-q})`
    pub fn util(v: &ObjectiveVars) -> f64 {
        radt(v) * (1.0 - (-v.q).exp())
    }

    /// `c = (e^{alpha*s} - 1) * (1 - gamma*r')`
    pub fn cost(v: &ObjectiveVars) -> f64 {
        ((v.model.alpha * v.s).exp() - 1.0) * (1.0 - v.model.gamma * radt(v))
    }

    /// `x' = R * (x - r'*q)`
    pub fn wltt(v: &ObjectiveVars) -> f64 {
        v.model.r_coef * (v.x - radt(v) * v.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn model() -> Model {
        Model {
            alpha: 0.1,
            beta: 0.95,
            delta: 0.2,
            gamma: 0.3,
            r_coef: 1.02,
            util_part: ObjectivePart::Util,
            cost_part: ObjectivePart::Cost,
            radt_part: ObjectivePart::RadiusTransition,
            wltt_part: ObjectivePart::WealthTransition,
        }
    }

    #[test]
    fn radius_transition_collapses_to_full_radius_at_zero_effort() {
        let m = model();
        let v = ObjectiveVars {
            model: &m,
            x: 1.0,
            r: 0.5,
            q: 0.0,
            s: 0.0,
        };
        // e^0 = 1, so r' = 1 - (1 - delta*r)
        assert!((exponential::radt(&v) - m.delta * 0.5).abs() < 1e-12);
    }

    #[test]
    fn label_round_trips() {
        for p in [
            ObjectivePart::Util,
            ObjectivePart::Cost,
            ObjectivePart::RadiusTransition,
            ObjectivePart::WealthTransition,
        ] {
            assert_eq!(ObjectivePart::from_label(p.label()), Some(p));
        }
    }
}
