// This file is part of the terraform-provider-taikun project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [`Diagnostics`] module

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    borrow::Cow,
    fmt::Display,
};

use crate::attribute_path::AttributePath;

/// Errors and warnings accumulated while serving one operation
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Diagnostics {
    /// List of errors
    pub errors: Vec<Diagnostic>,
    /// List of warnings
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Add an error diagnostic
    pub fn add_error(&mut self, diag: Diagnostic) {
        self.errors.push(diag)
    }
    /// Add a warning diagnostic
    pub fn add_warning(&mut self, diag: Diagnostic) {
        self.warnings.push(diag)
    }
    /// Add an error
    pub fn error<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        &mut self,
        summary: S,
        detail: D,
        attribute: AttributePath,
    ) {
        self.add_error(Diagnostic::new(summary, detail, attribute))
    }
    /// Add an error without AttributePath
    pub fn root_error<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        &mut self,
        summary: S,
        detail: D,
    ) {
        self.add_error(Diagnostic::root(summary, detail))
    }
    /// Add an error without details
    pub fn error_short<S: Into<Cow<'static, str>>>(
        &mut self,
        summary: S,
        attribute: AttributePath,
    ) {
        self.add_error(Diagnostic::short(summary, attribute))
    }
    /// Add an error without AttributePath nor details
    pub fn root_error_short<S: Into<Cow<'static, str>>>(&mut self, summary: S) {
        self.add_error(Diagnostic::root_short(summary))
    }

    /// Add a warning
    pub fn warning<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        &mut self,
        summary: S,
        detail: D,
        attribute: AttributePath,
    ) {
        self.add_warning(Diagnostic::new(summary, detail, attribute))
    }
    /// Add a warning without AttributePath
    pub fn root_warning<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        &mut self,
        summary: S,
        detail: D,
    ) {
        self.add_warning(Diagnostic::root(summary, detail))
    }
    /// Add a warning without AttributePath nor details
    pub fn root_warning_short<S: Into<Cow<'static, str>>>(&mut self, summary: S) {
        self.add_warning(Diagnostic::root_short(summary))
    }
    /// Merge other diagnostics into these
    pub fn add_diagnostics(&mut self, mut diags: Diagnostics) {
        self.errors.append(&mut diags.errors);
        self.warnings.append(&mut diags.warnings);
    }
    /// Add an internal error if there is no existing errors
    pub fn internal_error(&mut self) {
        if self.errors.is_empty() {
            let backtrace = Backtrace::capture();
            let detail = if backtrace.status() == BacktraceStatus::Captured {
                backtrace.to_string()
            } else {
                String::new()
            };
            self.root_error("Internal Error", detail);
        }
    }
    /// Check whether at least one error has been reported
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
    /// Find the first error whose summary contains `pattern`
    pub fn find_error(&self, pattern: &str) -> Option<&Diagnostic> {
        self.errors
            .iter()
            .find(|diag| diag.summary.contains(pattern) || diag.detail.contains(pattern))
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for diag in &self.errors {
            writeln!(f, "Error: {diag}")?;
        }
        for diag in &self.warnings {
            writeln!(f, "Warning: {diag}")?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Diagnostic {
    pub summary: Cow<'static, str>,
    pub detail: Cow<'static, str>,
    pub attribute: AttributePath,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        summary: S,
        detail: D,
        attribute: AttributePath,
    ) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            attribute,
        }
    }
    /// Create a diagnostic without AttributePath
    pub fn root<S: Into<Cow<'static, str>>, D: Into<Cow<'static, str>>>(
        summary: S,
        detail: D,
    ) -> Self {
        Self::new(summary, detail, Default::default())
    }
    /// Create a diagnostic without details
    pub fn short<S: Into<Cow<'static, str>>>(summary: S, attribute: AttributePath) -> Self {
        Self::new(summary, String::default(), attribute)
    }
    /// Create a diagnostic AttributePath nor details
    pub fn root_short<S: Into<Cow<'static, str>>>(summary: S) -> Self {
        Self::new(summary, String::default(), Default::default())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.attribute.steps.is_empty() {
            write!(f, "{}: ", self.attribute)?;
        }
        f.write_str(&self.summary)?;
        if !self.detail.is_empty() {
            write!(f, "\n  {}", self.detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_errors_then_warnings() {
        let mut diags = Diagnostics::default();
        diags.root_warning_short("slow");
        diags.error_short("bad value", AttributePath::new("rules").index(1).attribute("port"));
        let text = diags.to_string();
        assert_eq!(text, "Error: rules[1].port: bad value\nWarning: slow\n");
        assert!(diags.has_errors());
        assert!(diags.find_error("bad").is_some());
    }

    #[test]
    fn internal_error_only_when_empty() {
        let mut diags = Diagnostics::default();
        diags.root_error_short("first");
        diags.internal_error();
        assert_eq!(diags.errors.len(), 1);

        let mut diags = Diagnostics::default();
        diags.internal_error();
        assert_eq!(diags.errors[0].summary, "Internal Error");
    }
}
