use std::cmp::max;

use crate::note::Note;
use crate::utils::{localize_millis, termsize};

/// Column widths for a note listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    pub colsep: usize,
    pub id_width: usize,
    pub title_width: usize,
    pub updated_width: usize,
}

impl LineFormat {
    pub fn new(notes: &[Note], condensed: bool, show_body: bool) -> LineFormat {
        let colsep = if condensed { 1 } else { 2 };

        let id_width = notes.iter()
                            .map(|n| n.id.chars().count())
                            .fold("id".len(), max);
        let title_width = notes.iter()
                               .map(|n| {
                                   let len = n.display_title().chars().count();
                                   if !n.body.is_empty() && !show_body { len + 4 } else { len }
                               })
                               .fold("title".len(), max);
        let updated_width = notes.iter()
                                 .map(|n| localize_millis(n.updated).chars().count())
                                 .fold("last updated".len(), max);

        let mut format = LineFormat {
            colsep: colsep,
            id_width: id_width,
            title_width: title_width,
            updated_width: updated_width,
        };

        // shrink the title column to fit the terminal, never below the header
        let console_width = termsize();
        if console_width > 0 && format.line_width() > console_width {
            let overflow = format.line_width() - console_width;
            format.title_width = max(format.title_width.saturating_sub(overflow), "title".len());
        }
        format
    }

    pub fn line_width(&self) -> usize {
        self.id_width + self.title_width + self.updated_width + 2 * self.colsep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_never_smaller_than_headers() {
        let format = LineFormat::new(&[], false, false);
        assert_eq!(format.id_width, 2);
        assert_eq!(format.title_width, 5);
        assert_eq!(format.updated_width, 12);
        assert_eq!(format.colsep, 2);
    }

    #[test]
    fn condensed_uses_single_space() {
        let format = LineFormat::new(&[], true, false);
        assert_eq!(format.colsep, 1);
        assert_eq!(format.line_width(), 2 + 5 + 12 + 2);
    }
}
