//! Inline editor for a single metric row

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::core::{Action, Context, Module};
use crate::domain::{format_target, parse_target, validate_target, Metric, MetricType, TargetError};
use crate::editor::SaveRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please add a title for your metric.")]
    TitleRequired,
    #[error("A metric with the title '{0}' already exists.")]
    DuplicateTitle(String),
    #[error("Invalid target: {0}")]
    Target(#[from] TargetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Target,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Title, FormField::Target, FormField::Description];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Target => "Target per run",
            FormField::Description => "Description",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Target,
            FormField::Target => FormField::Description,
            FormField::Description => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Target => FormField::Title,
            FormField::Description => FormField::Target,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricForm {
    index: usize,
    base: Metric,
    other_titles: Vec<String>,
    title: String,
    target: String,
    description: String,
    focus: FormField,
    error: Option<FormError>,
}

impl MetricForm {
    /// Form for the metric at `index`, checked against its siblings' titles
    pub fn new(index: usize, metric: &Metric, other_titles: Vec<String>) -> Self {
        // A zero target shows as an empty field so new metrics start blank.
        let target = if metric.target == 0 {
            String::new()
        } else {
            format_target(metric.target, metric.metric_type)
        };
        Self {
            index,
            base: metric.clone(),
            other_titles,
            title: metric.title.clone(),
            target,
            description: metric.description.clone(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn metric_type(&self) -> MetricType {
        self.base.metric_type
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Target => &self.target,
            FormField::Description => &self.description,
        }
    }

    pub fn target_hint(&self) -> &'static str {
        match self.base.metric_type {
            MetricType::Duration => "dd:hh:mm",
            MetricType::Currency => "whole dollars",
            MetricType::Integer => "whole number",
        }
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.field_mut().push(ch);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
        self.error = None;
    }

    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.title = value,
            FormField::Target => self.target = value,
            FormField::Description => self.description = value,
        }
        self.error = None;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Target => &mut self.target,
            FormField::Description => &mut self.description,
        }
    }

    fn build(&self) -> Result<Metric, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleRequired);
        }
        let lowered = title.to_lowercase();
        if self
            .other_titles
            .iter()
            .any(|other| other.trim().to_lowercase() == lowered)
        {
            return Err(FormError::DuplicateTitle(title.to_string()));
        }

        let target_text = self.target.trim();
        validate_target(target_text, self.base.metric_type)?;
        let target = parse_target(target_text, self.base.metric_type)?;

        Ok(Metric {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            target,
            ..self.base.clone()
        })
    }
}

impl SaveRequest for MetricForm {
    type Error = FormError;

    fn try_save(&mut self) -> Result<Metric, FormError> {
        let result = self.build();
        self.error = result.as_ref().err().cloned();
        result
    }
}

impl Module for MetricForm {
    fn handle_key(&mut self, key: KeyEvent, _ctx: &Context) -> Action {
        match key.code {
            KeyCode::Enter => Action::Save,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.next_field();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prev_field();
                Action::None
            }
            KeyCode::Backspace => {
                self.backspace();
                Action::None
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(ch);
                Action::None
            }
            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut MetricForm, text: &str) {
        let ctx = Context::new();
        for ch in text.chars() {
            form.handle_key(key(KeyCode::Char(ch)), &ctx);
        }
    }

    #[test]
    fn test_new_metric_starts_blank() {
        let form = MetricForm::new(0, &Metric::new(MetricType::Duration), Vec::new());
        assert_eq!(form.value(FormField::Title), "");
        assert_eq!(form.value(FormField::Target), "");
        assert_eq!(form.focus(), FormField::Title);
    }

    #[test]
    fn test_existing_target_is_formatted() {
        let metric = Metric {
            target: 90_000_000,
            ..Metric::new(MetricType::Duration)
        };
        let form = MetricForm::new(0, &metric, Vec::new());
        assert_eq!(form.value(FormField::Target), "01:01:00");
    }

    #[test]
    fn test_typing_and_saving() {
        let ctx = Context::new();
        let mut form = MetricForm::new(2, &Metric::new(MetricType::Duration), Vec::new());
        type_text(&mut form, "Time to resolve");
        form.handle_key(key(KeyCode::Tab), &ctx);
        type_text(&mut form, "00:02:30");
        form.handle_key(key(KeyCode::Tab), &ctx);
        type_text(&mut form, "From declaration to resolution");

        assert_eq!(form.handle_key(key(KeyCode::Enter), &ctx), Action::Save);
        let metric = form.try_save().unwrap();
        assert_eq!(metric.title, "Time to resolve");
        assert_eq!(metric.target, 150 * 60 * 1000);
        assert_eq!(metric.description, "From declaration to resolution");
        assert_eq!(metric.metric_type, MetricType::Duration);
        assert_eq!(form.index(), 2);
        assert!(form.error().is_none());
    }

    #[test]
    fn test_title_required() {
        let mut form = MetricForm::new(0, &Metric::new(MetricType::Integer), Vec::new());
        form.set_value(FormField::Title, "   ");
        assert_eq!(form.try_save(), Err(FormError::TitleRequired));
        assert_eq!(form.error(), Some(&FormError::TitleRequired));
    }

    #[test]
    fn test_duplicate_title_is_case_insensitive() {
        let mut form = MetricForm::new(
            1,
            &Metric::new(MetricType::Integer),
            vec!["Customers affected".to_string()],
        );
        form.set_value(FormField::Title, "customers AFFECTED ");
        assert_eq!(
            form.try_save(),
            Err(FormError::DuplicateTitle("customers AFFECTED".to_string()))
        );
    }

    #[test]
    fn test_invalid_target_rejected() {
        let mut form = MetricForm::new(0, &Metric::new(MetricType::Duration), Vec::new());
        form.set_value(FormField::Title, "TTA");
        form.set_value(FormField::Target, "2 hours");
        assert!(matches!(form.try_save(), Err(FormError::Target(_))));

        // Editing clears the stale error.
        form.backspace();
        assert!(form.error().is_none());
    }

    #[test]
    fn test_keeps_id_and_type() {
        let metric = Metric {
            id: "persisted".to_string(),
            title: "Cost".to_string(),
            ..Metric::new(MetricType::Currency)
        };
        let mut form = MetricForm::new(0, &metric, Vec::new());
        form.set_value(FormField::Target, "2500");
        let saved = form.try_save().unwrap();
        assert_eq!(saved.id, "persisted");
        assert_eq!(saved.metric_type, MetricType::Currency);
        assert_eq!(saved.target, 2500);
    }

    #[test]
    fn test_escape_cancels_and_control_keys_ignored() {
        let ctx = Context::new();
        let mut form = MetricForm::new(0, &Metric::new(MetricType::Integer), Vec::new());
        assert_eq!(form.handle_key(key(KeyCode::Esc), &ctx), Action::Cancel);
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(form.handle_key(ctrl_a, &ctx), Action::None);
        assert_eq!(form.value(FormField::Title), "");
    }

    #[test]
    fn test_field_cycle() {
        let ctx = Context::new();
        let mut form = MetricForm::new(0, &Metric::new(MetricType::Integer), Vec::new());
        form.handle_key(key(KeyCode::BackTab), &ctx);
        assert_eq!(form.focus(), FormField::Description);
        form.handle_key(key(KeyCode::Down), &ctx);
        assert_eq!(form.focus(), FormField::Title);
    }
}
