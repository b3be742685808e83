//! Form panel state: field values, selection and inline errors.

use crate::form::{Field, FieldError, FormState};

/// The form as shown on screen.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub values: FormState,
    selected: usize,
    errors: Vec<FieldError>,
}

impl FormView {
    pub fn new(values: FormState) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    pub fn selected(&self) -> Field {
        Field::ALL[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, field: Field) {
        self.selected = field.index();
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Field::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + Field::ALL.len() - 1) % Field::ALL.len();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = Field::ALL.len() - 1;
    }

    /// Set a field and drop its stale errors.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value);
        self.clear_errors_for(field);
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: Vec<FieldError>) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn clear_errors_for(&mut self, field: Field) {
        self.errors.retain(|e| e.field != field);
    }

    /// First error message for a field, if any.
    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Restore default values, dropping credentials and errors.
    pub fn reset(&mut self) {
        self.values.reset();
        self.errors.clear();
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut form = FormView::default();
        assert_eq!(form.selected(), Field::ALL[0]);
        form.select_previous();
        assert_eq!(form.selected(), *Field::ALL.last().unwrap());
        form.select_next();
        assert_eq!(form.selected_index(), 0);
    }

    #[test]
    fn test_set_clears_field_errors() {
        let mut form = FormView::default();
        form.set_errors(vec![
            FieldError::new(Field::Login, "required"),
            FieldError::new(Field::Server, "required"),
        ]);
        assert_eq!(form.error_for(Field::Login), Some("required"));

        form.set(Field::Login, "12345");
        assert_eq!(form.error_for(Field::Login), None);
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn test_reset_drops_credentials() {
        let mut form = FormView::default();
        form.set(Field::Password, "pw");
        form.select(Field::Server);
        form.reset();
        assert_eq!(form.values.get(Field::Password), "");
        assert_eq!(form.selected_index(), 0);
    }
}
