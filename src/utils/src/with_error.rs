// Copyright © liaptui 2025-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Arguments, Debug, Display};

use color_eyre::Report;

use crate::outcome::{StopCondition, Value};

/// Builds the error halt behind [crate::fail] and [crate::verify].
///
/// Keeping report construction here means dependent crates use the macros
/// without naming the report crate themselves.
#[doc(hidden)]
pub fn failure(message: Arguments<'_>) -> StopCondition {
    StopCondition::Error(Report::msg(message.to_string()))
}

/// Halts the current mutation with an error condition.
///
/// Takes anything `format!` takes.
#[macro_export]
macro_rules! fail {
    ($($message:tt)+) => {
        return Err($crate::with_error::failure(format_args!($($message)+)))
    };
}

/// Halts the current mutation with an error condition unless the predicate
/// holds. With no message, the stringified predicate is reported.
#[macro_export]
macro_rules! verify {
    ($cond:expr $(,)?) => {
        $crate::verify!($cond, concat!("condition failed: `", stringify!($cond), "`"))
    };
    ($cond:expr, $($message:tt)+) => {
        if !$cond {
            return Err($crate::with_error::failure(format_args!($($message)+)));
        }
    };
}

/// Converts a fallible value into the outcome system, attaching context
/// built only when the failure actually happens.
pub trait WithError<T, E> {
    fn with_error<C, F>(self, context: F) -> Value<T>
    where
        C: Display + Debug + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> WithError<T, E> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn with_error<C, F>(self, context: F) -> Value<T>
    where
        C: Display + Debug + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|source| StopCondition::Error(Report::new(source).wrap_err(context())))
    }
}

/// A missing value carries no source error; the context becomes the whole
/// report.
impl<T> WithError<T, Infallible> for Option<T> {
    fn with_error<C, F>(self, context: F) -> Value<T>
    where
        C: Display + Debug + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        match self {
            Some(value) => Ok(value),
            None => Err(StopCondition::Error(Report::msg(context()))),
        }
    }
}
