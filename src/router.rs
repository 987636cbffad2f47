#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Requirements,
    Tuition,
}

impl Route {
    /// Navigation order.
    pub const ALL: [Route; 3] = [Route::Home, Route::Requirements, Route::Tuition];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Requirements => "/requirements",
            Route::Tuition => "/tuition",
        }
    }

    /// Unmatched paths are not routed anywhere.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Requirements => "Admission Requirements",
            Route::Tuition => "Tuition & Financial Aid",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Route::Home => 0,
            Route::Requirements => 1,
            Route::Tuition => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
