use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use folio_core::{
    AgentGateway, ConversationController, Effect, GatewayError, PendingQuery, Portfolio,
    SessionMetadata,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Dashboard,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Dashboard => "Dashboard",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Screen::Home => Screen::Dashboard,
            Screen::Dashboard => Screen::Home,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub portfolio: Portfolio,

    // Chat widget
    pub chat: ConversationController,
    pub gateway: Arc<dyn AgentGateway>,
    pub query_task: Option<JoinHandle<Result<String, GatewayError>>>,
    pub input_focused: bool,
    pub focus_at: Option<Instant>,
    pub suggestion_state: ListState,

    // Scrolling
    pub page_scroll: u16,
    pub chat_scroll: u16,
    pub scroll_to_end_pending: bool,
    pub chat_height: u16, // inner height of the message list
    pub chat_width: u16,  // inner width, for wrap estimates

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub launcher_area: Option<Rect>,
    pub suggestions_area: Option<Rect>,
}

impl App {
    pub fn new(portfolio: Portfolio, gateway: Arc<dyn AgentGateway>, session: SessionMetadata) -> Self {
        let chat = ConversationController::new(portfolio.greeting.clone(), session);

        Self {
            should_quit: false,
            screen: Screen::Home,
            portfolio,

            chat,
            gateway,
            query_task: None,
            input_focused: false,
            focus_at: None,
            suggestion_state: ListState::default(),

            page_scroll: 0,
            chat_scroll: 0,
            scroll_to_end_pending: false,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            chat_area: None,
            launcher_area: None,
            suggestions_area: None,
        }
    }

    pub fn open_chat(&mut self) {
        self.chat.open_panel();
    }

    pub fn close_chat(&mut self) {
        self.chat.close_panel();
        self.input_focused = false;
        self.focus_at = None;
    }

    pub fn toggle_chat(&mut self) {
        self.chat.toggle_panel();
        if !self.chat.state().is_panel_open() {
            self.input_focused = false;
            self.focus_at = None;
        }
    }

    /// Send the input buffer to the agent.
    pub fn submit_input(&mut self) {
        if let Some(query) = self.chat.begin_submit_input() {
            self.spawn_query(query);
        }
    }

    /// Send the suggested prompt at `index`, if suggestions are on offer.
    pub fn submit_suggestion(&mut self, index: usize) {
        if !self.chat.show_suggestions() {
            return;
        }
        let Some(prompt) = self.portfolio.suggestion(index).map(str::to_string) else {
            return;
        };
        // The input is cleared either way, matching a typed submission.
        if let Some(query) = self.chat.begin_submit(&prompt) {
            self.suggestion_state.select(None);
            self.spawn_query(query);
        }
    }

    fn spawn_query(&mut self, query: PendingQuery) {
        let gateway = Arc::clone(&self.gateway);
        let session = self.chat.session().clone();
        info!(request = %query.request, "asking agent");
        self.query_task = Some(tokio::spawn(async move {
            gateway.query_agent(&query, &session).await
        }));
    }

    /// Collect the agent's answer once the background request has finished.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.query_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(GatewayError::Task(e.to_string())),
            };
            self.chat.settle(result);
        }
    }

    /// Turn queued controller effects into scheduled UI work.
    pub fn apply_effects(&mut self, now: Instant) {
        for effect in self.chat.take_effects() {
            match effect {
                Effect::FocusInput { after } => {
                    debug!(?after, "focus scheduled");
                    self.focus_at = Some(now + after);
                }
                Effect::ScrollToEnd => self.scroll_to_end_pending = true,
            }
        }
    }

    /// Tick animation frame and fire any due focus transfer.
    pub fn tick(&mut self, now: Instant) {
        if self.chat.is_awaiting_response() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        if let Some(at) = self.focus_at {
            if now >= at {
                self.focus_at = None;
                if self.chat.state().is_panel_open() {
                    self.input_focused = true;
                }
            }
        }
    }

    /// Rough count of rendered lines in the message list at `wrap_width`.
    pub fn chat_line_count(&self, wrap_width: usize) -> u16 {
        let wrap_width = wrap_width.max(1);
        let mut total_lines: usize = 0;

        for msg in self.chat.state().messages() {
            total_lines += 1; // Role and time line
            for line in msg.content().lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines += (char_count.max(1) - 1) / wrap_width + 1;
            }
            if msg.content().is_empty() {
                total_lines += 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_awaiting_response() {
            total_lines += 2; // role line + typing indicator
        }

        // Paragraph scroll offsets are u16
        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }

    /// Scroll the message list so the newest message is in view.
    pub fn scroll_chat_to_end(&mut self) {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 40 };
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 12 };

        let total_lines = self.chat_line_count(wrap_width);
        self.chat_scroll = total_lines.saturating_sub(visible_height);
        self.scroll_to_end_pending = false;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 40 };
        let max = self
            .chat_line_count(wrap_width)
            .saturating_sub(self.chat_height.max(1));
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    // Suggestion list navigation
    pub fn suggestion_nav_down(&mut self) {
        let len = self.portfolio.suggested_prompts.len();
        if len > 0 {
            let i = self.suggestion_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.suggestion_state.select(Some(i));
        }
    }

    pub fn suggestion_nav_up(&mut self) {
        if let Some(i) = self.suggestion_state.selected() {
            if i == 0 {
                self.suggestion_state.select(None);
            } else {
                self.suggestion_state.select(Some(i - 1));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::{Role, ERROR_REPLY};
    use std::time::Duration;

    /// Answers every question by echoing it back, or fails when told to.
    pub(crate) struct EchoGateway {
        pub fail: bool,
    }

    #[async_trait]
    impl AgentGateway for EchoGateway {
        async fn query_agent(
            &self,
            query: &PendingQuery,
            _session: &SessionMetadata,
        ) -> Result<String, GatewayError> {
            if self.fail {
                Err(GatewayError::Task("offline".into()))
            } else {
                Ok(format!("echo: {}", query.text))
            }
        }
    }

    pub(crate) fn test_app(fail: bool) -> App {
        App::new(
            Portfolio::default(),
            Arc::new(EchoGateway { fail }),
            SessionMetadata::new("test-agent"),
        )
    }

    pub(crate) async fn wait_for_reply(app: &mut App) {
        for _ in 0..100 {
            app.poll_query_task().await;
            if app.query_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("agent reply never arrived");
    }

    #[tokio::test]
    async fn typed_question_gets_reply() {
        let mut app = test_app(false);
        app.chat.input_mut().insert_str("hello");

        app.submit_input();
        assert!(app.chat.is_awaiting_response());
        assert_eq!(app.chat.state().messages().len(), 2);

        wait_for_reply(&mut app).await;
        let last = app.chat.state().last_message().unwrap();
        assert_eq!(last.role(), Role::Agent);
        assert_eq!(last.content(), "echo: hello");
        assert!(!app.chat.is_awaiting_response());
    }

    #[tokio::test]
    async fn failed_request_shows_error_reply() {
        let mut app = test_app(true);
        app.chat.input_mut().insert_str("hello");

        app.submit_input();
        wait_for_reply(&mut app).await;

        assert_eq!(app.chat.state().last_message().unwrap().content(), ERROR_REPLY);
        assert!(!app.chat.is_awaiting_response());
    }

    #[tokio::test]
    async fn suggestion_submits_prompt_once() {
        let mut app = test_app(false);

        app.submit_suggestion(0);
        let prompt = app.portfolio.suggested_prompts[0].clone();
        assert_eq!(app.chat.state().messages()[1].content(), prompt);

        // Suggestions are gone once a question is asked.
        app.submit_suggestion(1);
        wait_for_reply(&mut app).await;
        app.submit_suggestion(1);
        assert_eq!(app.chat.state().messages().len(), 3);
    }

    #[tokio::test]
    async fn focus_moves_to_input_after_delay() {
        let mut app = test_app(false);
        let start = Instant::now();

        app.open_chat();
        app.apply_effects(start);
        assert!(app.scroll_to_end_pending);
        assert!(!app.input_focused);

        app.tick(start + Duration::from_millis(10));
        assert!(!app.input_focused);

        app.tick(start + folio_core::FOCUS_DELAY);
        assert!(app.input_focused);
        assert!(app.focus_at.is_none());
    }

    #[tokio::test]
    async fn closing_before_delay_cancels_focus() {
        let mut app = test_app(false);
        let start = Instant::now();

        app.open_chat();
        app.apply_effects(start);
        app.close_chat();
        app.tick(start + Duration::from_secs(1));

        assert!(!app.input_focused);
    }

    #[tokio::test]
    async fn toggling_closed_drops_focus() {
        let mut app = test_app(false);
        let start = Instant::now();

        app.toggle_chat();
        app.apply_effects(start);
        app.tick(start + folio_core::FOCUS_DELAY);
        assert!(app.input_focused);

        app.toggle_chat();
        assert!(!app.chat.state().is_panel_open());
        assert!(!app.input_focused);
        assert!(app.focus_at.is_none());
    }

    #[tokio::test]
    async fn scroll_to_end_accounts_for_wrapping() {
        let mut app = test_app(false);
        app.chat_width = 10;
        app.chat_height = 3;

        // greeting wraps over many lines at width 10
        let lines = app.chat_line_count(10);
        assert!(lines > 3);

        app.scroll_chat_to_end();
        assert_eq!(app.chat_scroll, lines - 3);
        assert!(!app.scroll_to_end_pending);

        app.scroll_chat_up(100);
        assert_eq!(app.chat_scroll, 0);
        app.scroll_chat_down(1000);
        assert_eq!(app.chat_scroll, lines - 3);
    }

    #[tokio::test]
    async fn huge_reply_saturates_line_count() {
        let mut app = test_app(false);
        app.chat_width = 40;
        app.chat_height = 10;

        app.chat.begin_submit("hi").unwrap();
        app.chat.settle(Ok("x\n".repeat(70_000)));

        assert_eq!(app.chat_line_count(40), u16::MAX);
        app.scroll_chat_to_end();
        assert_eq!(app.chat_scroll, u16::MAX - 10);

        app.scroll_chat_down(u16::MAX);
        assert_eq!(app.chat_scroll, u16::MAX - 10);
    }

    #[tokio::test]
    async fn suggestion_navigation_stays_in_bounds() {
        let mut app = test_app(false);
        app.suggestion_nav_up();
        assert_eq!(app.suggestion_state.selected(), None);

        for _ in 0..10 {
            app.suggestion_nav_down();
        }
        assert_eq!(app.suggestion_state.selected(), Some(3));

        for _ in 0..4 {
            app.suggestion_nav_up();
        }
        assert_eq!(app.suggestion_state.selected(), None);
    }
}
