use std::sync::Arc;

use lunchr_core::{DailyMenus, LunchService, MenuOutcome, SortOrder, SourceMenu, sort_menus};

pub(crate) struct App {
    pub service: Arc<LunchService>,
    pub sort: SortOrder,

    pub daily: Option<DailyMenus>,
    pub list_index: usize,

    pub is_loading: bool,
    pub notice: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<LunchService>, sort: SortOrder) -> Self {
        Self {
            service,
            sort,
            daily: None,
            list_index: 0,
            is_loading: false,
            notice: None,
            error_message: None,
        }
    }

    pub(crate) fn menus(&self) -> &[SourceMenu] {
        self.daily
            .as_ref()
            .map(|daily| daily.menus.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn selected(&self) -> Option<&SourceMenu> {
        self.menus().get(self.list_index)
    }

    pub(crate) fn select_previous(&mut self) {
        self.list_index = self.list_index.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.list_index + 1 < self.menus().len() {
            self.list_index += 1;
        }
    }

    /// Take over the answer of the service, keeping the current menus when throttled.
    pub(crate) fn apply(&mut self, outcome: MenuOutcome) {
        match outcome {
            MenuOutcome::Menus(mut daily) => {
                sort_menus(&mut daily.menus, self.sort);
                self.list_index = self.list_index.min(daily.menus.len().saturating_sub(1));
                self.daily = Some(daily);
                self.notice = None;
            }
            MenuOutcome::Throttled => {
                self.notice =
                    Some("Menus were refreshed a moment ago, try again in a few minutes".into());
            }
        }
    }
}
