use ratatui::text::Text;

/// Scrollable content region on the right-hand side.
///
/// Content is never wrapped, so the scroll range is the number of lines minus
/// the visible height.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    content: Text<'static>,
    offset: usize,
    height: u16,
}

impl Viewport {
    pub fn new(height: u16) -> Self {
        Self {
            content: Text::default(),
            offset: 0,
            height,
        }
    }

    pub fn content(&self) -> &Text<'static> {
        &self.content
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Replace the content and scroll back to the top.
    pub fn set_content(&mut self, content: Text<'static>) {
        self.content = content;
        self.offset = 0;
    }

    /// Replace the content keeping the scroll position where possible.
    pub fn refresh_content(&mut self, content: Text<'static>) {
        self.content = content;
        self.clamp();
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        self.clamp();
    }

    pub fn max_offset(&self) -> usize {
        self.content
            .height()
            .saturating_sub(usize::from(self.height))
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(self.half_page());
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.half_page());
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    fn page(&self) -> usize {
        usize::from(self.height.max(1))
    }

    fn half_page(&self) -> usize {
        (self.page() / 2).max(1)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }
}
