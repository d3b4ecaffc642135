/// One routed location: the entity it points at (`None` is home) and the
/// path shown for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct Location {
    pub(in crate::app) id: Option<String>,
    pub(in crate::app) url: String,
}

impl Location {
    pub(in crate::app) fn home() -> Self {
        Self {
            id: None,
            url: "/".to_owned(),
        }
    }
}

#[derive(Debug)]
pub(in crate::app) struct History {
    entries: Vec<Location>,
    cursor: usize,
}

impl History {
    pub(in crate::app) fn new(start: Location) -> Self {
        Self {
            entries: vec![start],
            cursor: 0,
        }
    }

    pub(in crate::app) fn current(&self) -> &Location {
        &self.entries[self.cursor]
    }

    /// Records a new location, dropping anything ahead of the cursor.
    /// Re-pushing the current route is ignored.
    pub(in crate::app) fn push(&mut self, location: Location) {
        if self.current().url == location.url {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location);
        self.cursor = self.entries.len() - 1;
    }

    pub(in crate::app) fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub(in crate::app) fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub(in crate::app) fn back(&mut self) -> Option<&Location> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub(in crate::app) fn forward(&mut self) -> Option<&Location> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }
}
