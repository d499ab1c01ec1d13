use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// An optional calendar date edited one part at a time.
///
/// Digits fill the current part; a part is committed once it has all its
/// digits and forms a real date. `Delete` clears the whole date.
#[derive(Clone, Debug)]
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.current_date_input.clear();
            if self.date.is_none() {
                self.date = Some(Local::now().date_naive());
            }
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => self.push_digit(c),
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Delete => {
                self.date = None;
                self.editing = false;
                self.current_date_input.clear();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn push_digit(&mut self, c: char) {
        let Some(date) = self.date else {
            return;
        };

        self.current_date_input.push(c);
        let width = match self.date_part {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        };
        if self.current_date_input.len() < width {
            return;
        }

        let candidate = self
            .current_date_input
            .parse::<u32>()
            .ok()
            .and_then(|value| match self.date_part {
                DatePart::Year if (1900..=2100).contains(&value) => {
                    // Feb 29 falls back to Feb 28 outside leap years
                    NaiveDate::from_ymd_opt(value as i32, date.month(), date.day()).or_else(|| {
                        NaiveDate::from_ymd_opt(value as i32, date.month(), date.day() - 1)
                    })
                }
                DatePart::Month => NaiveDate::from_ymd_opt(date.year(), value, date.day()),
                DatePart::Day => NaiveDate::from_ymd_opt(date.year(), date.month(), value),
                _ => None,
            });

        if let Some(new_date) = candidate {
            self.date = Some(new_date);
        }
        self.current_date_input.clear();
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return "-".to_string();
        };

        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );

        if !self.editing {
            return format!("{year}-{month}-{day}");
        }

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{year}{current_input}-{month}-{day}"),
            DatePart::Month => format!("{year}-{month}{current_input}-{day}"),
            DatePart::Day => format!("{year}-{month}-{day}{current_input}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(date: NaiveDate) -> DateInputState {
        let mut state = DateInputState::new(Some(date));
        state.toggle_editing();
        state
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_each_part() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        type_digits(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "06");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "30");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn test_impossible_day_is_ignored() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        state.handle_input(KeyCode::Left);
        type_digits(&mut state, "31");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert!(state.current_date_input.is_empty());
    }

    #[test]
    fn test_leap_day_survives_year_change() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        type_digits(&mut state, "2023");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2023, 2, 28));
    }

    #[test]
    fn test_delete_clears() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        state.handle_input(KeyCode::Delete);
        assert!(state.date.is_none());
        assert!(!state.editing);
        assert_eq!(state.get_display_string(), "-");
    }

    #[test]
    fn test_editing_empty_date_starts_from_today() {
        let mut state = DateInputState::new(None);
        state.toggle_editing();
        assert_eq!(state.date, Some(Local::now().date_naive()));
    }

    #[test]
    fn test_display_marks_current_part() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        state.handle_input(KeyCode::Right);
        assert_eq!(state.get_display_string(), "2024-03[MM]-05");
        state.handle_input(KeyCode::Char('1'));
        assert_eq!(state.get_display_string(), "2024-03[1]-05");
    }
}
