//! Metric type picker shown when adding a metric

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, Context, Module, NotifyLevel};
use crate::domain::{MetricType, MAX_METRICS};

#[derive(Debug, Clone, Default)]
pub struct AddMenu {
    selected: usize,
}

impl AddMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &'static [MetricType] {
        &MetricType::ALL
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_type(&self) -> MetricType {
        MetricType::ALL[self.selected]
    }

    fn pick(&self, metric_type: MetricType, ctx: &Context) -> Action {
        if !ctx.can_add() {
            return Action::Notify(
                format!("A playbook can hold at most {MAX_METRICS} metrics"),
                NotifyLevel::Warn,
            );
        }
        Action::AddMetric(metric_type)
    }
}

impl Module for AddMenu {
    fn handle_key(&mut self, key: KeyEvent, ctx: &Context) -> Action {
        let count = MetricType::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = (self.selected + count - 1) % count;
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected = (self.selected + 1) % count;
                Action::None
            }
            KeyCode::Enter => self.pick(self.selected_type(), ctx),
            KeyCode::Char(ch @ '1'..='3') => {
                let index = ch as usize - '1' as usize;
                self.selected = index;
                self.pick(MetricType::ALL[index], ctx)
            }
            KeyCode::Esc | KeyCode::Char('q') => Action::CloseOverlay,
            _ => Action::None,
        }
    }
}
