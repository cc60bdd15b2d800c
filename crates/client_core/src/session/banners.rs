use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Banner {
    ShortAnswer,
    OffTopic,
    Evaluating,
}

/// Visible banners. Nothing hides on its own: each banner is shown and
/// hidden explicitly, and [`BannerSet::clear`] runs on every question render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerSet(BTreeSet<Banner>);

impl BannerSet {
    pub fn show(&mut self, banner: Banner) {
        self.0.insert(banner);
    }

    pub fn hide(&mut self, banner: Banner) {
        self.0.remove(&banner);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, banner: Banner) -> bool {
        self.0.contains(&banner)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Banner> + '_ {
        self.0.iter().copied()
    }
}
