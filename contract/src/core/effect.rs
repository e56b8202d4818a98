//! Effect strings: `Condition;Operator;Amount;Stat`.

use std::fmt;

use serde::Serialize;

use crate::core::condition::{Condition, parse_condition};
use crate::core::error::{EffectParseError, EvalError, MalformedEffect};
use crate::core::types::Stat;

/// Arithmetic applied to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// `+` and `-` commute with each other; `*` and `/` do not commute with them.
    pub fn is_additive(self) -> bool {
        matches!(self, Operator::Add | Operator::Subtract)
    }

    /// Apply `self(amount)` to `value`. Division floors toward negative infinity.
    pub fn apply(self, value: i64, amount: i64) -> Result<i64, EvalError> {
        match self {
            Operator::Add => value.checked_add(amount).ok_or(EvalError::Overflow),
            Operator::Subtract => value.checked_sub(amount).ok_or(EvalError::Overflow),
            Operator::Multiply => value.checked_mul(amount).ok_or(EvalError::Overflow),
            Operator::Divide => floor_div(value, amount),
        }
    }
}

fn floor_div(value: i64, divisor: i64) -> Result<i64, EvalError> {
    if divisor == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let quotient = value.checked_div(divisor).ok_or(EvalError::Overflow)?;
    if value % divisor != 0 && ((value < 0) != (divisor < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Parsed effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Effect {
    pub condition: Condition,
    pub operator: Operator,
    pub amount: i64,
    pub stat: Stat,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.condition,
            self.operator.symbol(),
            self.amount,
            self.stat
        )
    }
}

/// Parse an effect string.
///
/// A `/` with amount 0 parses; the division is rejected when the effect is
/// applied, so the failure shows up in the pool trace for that effect only.
pub fn parse_effect(raw: &str) -> Result<Effect, EffectParseError> {
    let fields: Vec<&str> = raw.trim().split(';').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(MalformedEffect::FieldCount {
            raw: raw.to_string(),
            found: fields.len(),
        }
        .into());
    }

    let operator =
        Operator::parse(fields[1]).ok_or_else(|| MalformedEffect::Operator(fields[1].to_string()))?;
    let amount = fields[2]
        .parse::<i64>()
        .map_err(|_| MalformedEffect::Amount(fields[2].to_string()))?;
    let stat = fields[3]
        .parse::<Stat>()
        .map_err(|_| MalformedEffect::Stat(fields[3].to_string()))?;
    let condition = parse_condition(fields[0])?;

    Ok(Effect {
        condition,
        operator,
        amount,
        stat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::UnknownConditionKind;

    #[test]
    fn parses_plain_money_effect() {
        let effect = parse_effect("None;+;50;Money").expect("parse");
        assert_eq!(
            effect,
            Effect {
                condition: Condition::None,
                operator: Operator::Add,
                amount: 50,
                stat: Stat::Money,
            }
        );
        assert_eq!(effect.to_string(), "None;+;50;Money");
    }

    #[test]
    fn accepts_negative_amounts_and_whitespace() {
        let effect = parse_effect(" RunnerType:Face ; - ; -3 ; risk ").expect("parse");
        assert_eq!(effect.operator, Operator::Subtract);
        assert_eq!(effect.amount, -3);
        assert_eq!(effect.stat, Stat::Risk);
    }

    #[test]
    fn division_by_zero_parses() {
        let effect = parse_effect("None;/;0;Damage").expect("parse");
        assert_eq!(effect.operator, Operator::Divide);
        assert_eq!(effect.amount, 0);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            parse_effect("None;+;50"),
            Err(EffectParseError::Malformed(MalformedEffect::FieldCount {
                raw: "None;+;50".to_string(),
                found: 3
            }))
        );
        assert!(matches!(
            parse_effect("None;+;5;Money;extra"),
            Err(EffectParseError::Malformed(MalformedEffect::FieldCount { found: 5, .. }))
        ));
    }

    #[test]
    fn reports_the_bad_field() {
        assert_eq!(
            parse_effect("None;%;5;Money"),
            Err(MalformedEffect::Operator("%".to_string()).into())
        );
        assert_eq!(
            parse_effect("None;+;five;Money"),
            Err(MalformedEffect::Amount("five".to_string()).into())
        );
        assert_eq!(
            parse_effect("None;+;5;Gold"),
            Err(MalformedEffect::Stat("Gold".to_string()).into())
        );
        assert_eq!(
            parse_effect("Weather:rain;+;5;Money"),
            Err(UnknownConditionKind {
                kind: "Weather".to_string()
            }
            .into())
        );
    }

    #[test]
    fn floor_division_rounds_toward_negative_infinity() {
        assert_eq!(Operator::Divide.apply(7, 2), Ok(3));
        assert_eq!(Operator::Divide.apply(-7, 2), Ok(-4));
        assert_eq!(Operator::Divide.apply(7, -2), Ok(-4));
        assert_eq!(Operator::Divide.apply(-8, 2), Ok(-4));
        assert_eq!(Operator::Divide.apply(5, 0), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn overflow_is_an_error() {
        assert_eq!(Operator::Add.apply(i64::MAX, 1), Err(EvalError::Overflow));
        assert_eq!(Operator::Multiply.apply(i64::MIN, -1), Err(EvalError::Overflow));
        assert_eq!(Operator::Divide.apply(i64::MIN, -1), Err(EvalError::Overflow));
    }
}
