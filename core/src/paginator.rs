use serde::Serialize;

/// Rendered in place of an empty line so blank lines keep their height.
pub const BLANK_LINE: &str = "\u{00A0}";

pub const DEFAULT_LINES_PER_PAGE: usize = 30;

/// Fixed-size pages over a translated text blob.
///
/// Pages are 1-based. Navigation clamps at both ends and never errors.
#[derive(Debug, Clone)]
pub struct Paginator {
    lines: Vec<String>,
    lines_per_page: usize,
    current_page: usize,
}

/// Serializable view of the page on screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: usize,
    pub total_pages: usize,
    pub lines: Vec<String>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Paginator {
    pub fn new(text: &str, lines_per_page: usize) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Self {
            lines,
            lines_per_page: lines_per_page.max(1),
            current_page: 1,
        }
    }

    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_pages(&self) -> usize {
        self.lines.len().div_ceil(self.lines_per_page).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Jump to `page`, clamped into `1..=total_pages`. Returns the page landed on.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Raw lines of `page` (clamped), blank lines included as empty strings.
    pub fn page_lines(&self, page: usize) -> &[String] {
        let page = page.clamp(1, self.total_pages());
        let start = (page - 1) * self.lines_per_page;
        let end = (start + self.lines_per_page).min(self.lines.len());
        &self.lines[start.min(end)..end]
    }

    pub fn current_page_lines(&self) -> &[String] {
        self.page_lines(self.current_page)
    }

    /// Current page lines as they are drawn: empty lines become [`BLANK_LINE`].
    pub fn rendered_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.current_page_lines().iter().map(|line| render_line(line))
    }

    pub fn view(&self) -> PageView {
        PageView {
            page: self.current_page,
            total_pages: self.total_pages(),
            lines: self.rendered_lines().map(str::to_string).collect(),
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }
}

pub fn render_line(line: &str) -> &str {
    if line.is_empty() {
        BLANK_LINE
    } else {
        line
    }
}
