use crate::config::Settings;
use crate::store::Store;

/// State shared by every handler.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    store: Store,
    settings: Settings,
}

impl AppState {
    pub fn new(store: Store, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CourseFilter;

    #[test]
    fn test_app_state_default_settings() {
        let state = AppState::default();
        assert_eq!(
            state.settings().max_students_per_course(),
            crate::config::DEFAULT_MAX_STUDENTS_PER_COURSE
        );
    }

    #[test]
    fn test_with_settings_shares_handle() {
        let settings = Settings::new(4);
        let state = AppState::default().with_settings(settings.clone());

        settings.set_max_students_per_course(9);
        assert_eq!(state.settings().max_students_per_course(), 9);
    }

    #[tokio::test]
    async fn test_with_store_shares_tables() {
        let store = Store::new();
        let state = AppState::default().with_store(store.clone());

        store
            .create_course(
                crate::model::NewCourse {
                    name: "shared".to_string(),
                    students: Vec::new(),
                },
                1,
            )
            .await
            .unwrap();

        let courses = state.store().list_courses(&CourseFilter::default()).await;
        assert_eq!(courses.len(), 1);
    }
}
