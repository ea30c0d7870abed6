use super::item::{MenuItem, SettingValue};
use super::settings;

/// How a level is presented: the 3D wheel, or a flat settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStyle {
    Wheel,
    List,
}

impl LevelStyle {
    fn for_items(items: &[MenuItem]) -> Self {
        if items.iter().any(MenuItem::is_setting) {
            Self::List
        } else {
            Self::Wheel
        }
    }
}

/// One frame of the navigation stack. `path` addresses the submenu this level
/// lists, as child indices from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuLevel {
    path: Vec<usize>,
    pub title: String,
    /// Selection to restore when this level becomes active again.
    pub remembered: Option<usize>,
    pub style: LevelStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Descend {
    Entered,
    /// The selected submenu has nothing to show.
    Empty(String),
    NotSubmenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ascend {
    Popped,
    /// Already at the root: the owner should leave the menu.
    Exit,
}

fn resolve<'a>(root: &'a [MenuItem], path: &[usize]) -> Option<&'a [MenuItem]> {
    path.iter()
        .try_fold(root, |items, &i| items.get(i)?.children())
}

/// Owns the menu tree and the stack of levels over it. The active level is
/// held apart from its parents so the stack can never be empty.
#[derive(Debug, Clone)]
pub struct Navigator {
    root: Vec<MenuItem>,
    parents: Vec<MenuLevel>,
    current: MenuLevel,
    selected: usize,
    generation: u64,
}

impl Navigator {
    pub fn new(root: Vec<MenuItem>, title: impl Into<String>) -> Self {
        Self {
            current: MenuLevel {
                path: Vec::new(),
                title: title.into(),
                remembered: None,
                style: LevelStyle::Wheel,
            },
            root,
            parents: Vec::new(),
            selected: 0,
            generation: 0,
        }
    }

    pub fn root(&self) -> &[MenuItem] {
        &self.root
    }

    pub fn items(&self) -> &[MenuItem] {
        resolve(&self.root, &self.current.path).unwrap_or_default()
    }

    pub fn level(&self) -> &MenuLevel {
        &self.current
    }

    pub fn style(&self) -> LevelStyle {
        self.current.style
    }

    pub fn depth(&self) -> usize {
        self.parents.len() + 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&MenuItem> {
        self.items().get(self.selected)
    }

    /// Changes every time the active item list is swapped for another one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.items().len().saturating_sub(1));
    }

    /// Moves the selection by `delta`, wrapping around. Returns whether the
    /// selection changed.
    pub fn move_by(&mut self, delta: isize) -> bool {
        let n = self.items().len();
        if n == 0 {
            return false;
        }
        let next = (self.selected as isize + delta).rem_euclid(n as isize) as usize;
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    pub fn descend(&mut self) -> Descend {
        let Some(item) = self.selected_item() else {
            return Descend::NotSubmenu;
        };
        let Some(children) = item.children() else {
            return Descend::NotSubmenu;
        };
        if children.is_empty() {
            return Descend::Empty(item.label.clone());
        }

        let mut path = self.current.path.clone();
        path.push(self.selected);
        let level = MenuLevel {
            path,
            title: item.label.clone(),
            remembered: None,
            style: LevelStyle::for_items(children),
        };

        let mut parent = std::mem::replace(&mut self.current, level);
        parent.remembered = Some(self.selected);
        log::debug!("Entered '{}' from index {}", self.current.title, self.selected);
        self.parents.push(parent);
        self.selected = 0;
        self.generation += 1;
        Descend::Entered
    }

    pub fn ascend(&mut self) -> Ascend {
        let Some(parent) = self.parents.pop() else {
            return Ascend::Exit;
        };
        self.current = parent;
        let restored = self.current.remembered.take().unwrap_or(0);
        self.select(restored);
        self.generation += 1;
        Ascend::Popped
    }

    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        settings::find(&self.root, id)
    }

    /// Writes a setting value through the tree by id.
    pub fn update_at(&mut self, id: &str, value: &SettingValue) -> bool {
        settings::update_at(&mut self.root, id, value)
    }

    /// Swaps the whole tree, keeping as much of the current stack as still
    /// resolves to a non-empty submenu. The selection is clamped.
    pub fn replace_root(&mut self, root: Vec<MenuItem>) {
        self.root = root;

        let mut levels = std::mem::take(&mut self.parents);
        let top = std::mem::replace(
            &mut self.current,
            MenuLevel {
                path: Vec::new(),
                title: String::new(),
                remembered: None,
                style: LevelStyle::Wheel,
            },
        );
        levels.push(top);

        let valid = levels
            .iter()
            .take_while(|level| {
                resolve(&self.root, &level.path)
                    .is_some_and(|items| level.path.is_empty() || !items.is_empty())
            })
            .count()
            .max(1);
        let cut = valid < levels.len();
        levels.truncate(valid);

        for level in levels.iter_mut().skip(1) {
            if let Some(items) = resolve(&self.root, &level.path) {
                level.style = LevelStyle::for_items(items);
            }
        }

        if let Some(mut current) = levels.pop() {
            if cut {
                self.selected = current.remembered.take().unwrap_or(0);
            }
            self.current = current;
        }
        self.parents = levels;
        self.select(self.selected);
        self.generation += 1;
    }

    /// Titles of every level, root first.
    pub fn breadcrumb(&self) -> Vec<&str> {
        self.parents
            .iter()
            .chain(std::iter::once(&self.current))
            .map(|level| level.title.as_str())
            .collect()
    }
}
