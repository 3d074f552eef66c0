use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::category::CategoryValueSet;
use crate::core::dropdown::{Dropdown, MultiSelect};
use crate::core::error::FormError;
use crate::core::header::{HeaderRow, IngestedFile};
use crate::core::types::{DecayFunction, Side, SlotRole, TravelMode};
use crate::core::upload::UploadedFile;

/// Range and starting point of a numeric slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    value: f64,
    spec: SliderSpec,
}

impl Slider {
    pub fn new(spec: SliderSpec) -> Self {
        let mut slider = Self {
            value: spec.min,
            spec,
        };
        slider.set(spec.default);
        slider
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn spec(&self) -> &SliderSpec {
        &self.spec
    }

    /// Clamp into range and snap onto the step grid
    pub fn set(&mut self, value: f64) {
        let SliderSpec { min, max, step, .. } = self.spec;
        let clamped = value.clamp(min, max);
        let snapped = if step > 0.0 {
            min + ((clamped - min) / step).round() * step
        } else {
            clamped
        };
        self.value = (snapped.clamp(min, max) * 1e6).round() / 1e6;
    }

    pub fn increment(&mut self) {
        self.set(self.value + self.spec.step);
    }

    pub fn decrement(&mut self) {
        self.set(self.value - self.spec.step);
    }

    pub fn fraction(&self) -> f64 {
        let span = self.spec.max - self.spec.min;
        if span <= 0.0 {
            0.0
        } else {
            (self.value - self.spec.min) / span
        }
    }

    pub fn display(&self) -> String {
        let step = self.spec.step.to_string();
        let decimals = step.split('.').nth(1).map(str::len).unwrap_or(0);
        format!("{:.*}", decimals, self.value)
    }
}

/// Column names each role should preselect, per side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePresets {
    #[serde(default)]
    pub unique_id: Vec<String>,
    #[serde(default)]
    pub latitude: Vec<String>,
    #[serde(default)]
    pub longitude: Vec<String>,
    #[serde(default)]
    pub population: Vec<String>,
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
}

impl RolePresets {
    pub fn for_role(&self, role: SlotRole) -> &[String] {
        match role {
            SlotRole::UniqueId => &self.unique_id,
            SlotRole::Latitude => &self.latitude,
            SlotRole::Longitude => &self.longitude,
            SlotRole::Population => &self.population,
            SlotRole::Target => &self.target,
            SlotRole::Category => &self.category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPresets {
    #[serde(default)]
    pub origin: RolePresets,
    #[serde(default)]
    pub destination: RolePresets,
}

impl ColumnPresets {
    pub fn for_side(&self, side: Side) -> &RolePresets {
        match side {
            Side::Origin => &self.origin,
            Side::Destination => &self.destination,
        }
    }
}

/// Starting values for a fresh form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub decay_function: DecayFunction,
    pub epsilon: SliderSpec,
    pub walk_speed: SliderSpec,
    pub max_travel_time: SliderSpec,
    #[serde(default)]
    pub presets: ColumnPresets,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::Walk,
            decay_function: DecayFunction::Linear,
            epsilon: SliderSpec {
                default: 0.0,
                min: 0.0,
                max: 1.0,
                step: 0.05,
            },
            walk_speed: SliderSpec {
                default: 3.0,
                min: 1.0,
                max: 6.0,
                step: 0.5,
            },
            max_travel_time: SliderSpec {
                default: 30.0,
                min: 5.0,
                max: 120.0,
                step: 5.0,
            },
            presets: ColumnPresets::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub role: SlotRole,
    pub dropdown: Dropdown,
    /// Styling only; independent of whether the dropdown is enabled
    pub label_active: bool,
}

impl FieldSlot {
    fn new(role: SlotRole) -> Self {
        let dropdown = if role == SlotRole::Category {
            Dropdown::with_sentinel()
        } else {
            Dropdown::new()
        };
        Self {
            role,
            dropdown,
            label_active: false,
        }
    }
}

/// Identifies one file read. Only the newest ticket of a side may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub side: Side,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Stale,
    Failed,
}

/// The fields tied to one input file
#[derive(Debug, Clone)]
pub struct SlotGroup {
    side: Side,
    file: Option<UploadedFile>,
    pending: Option<UploadedFile>,
    state: SlotState,
    generation: u64,
    header: HeaderRow,
    body: Vec<String>,
    slots: Vec<FieldSlot>,
}

impl SlotGroup {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            file: None,
            pending: None,
            state: SlotState::Empty,
            generation: 0,
            header: HeaderRow::default(),
            body: Vec::new(),
            slots: side.roles().iter().map(|r| FieldSlot::new(*r)).collect(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == SlotState::Loaded
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    /// File whose read is still in flight
    pub fn pending(&self) -> Option<&UploadedFile> {
        self.pending.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn header(&self) -> &HeaderRow {
        &self.header
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn slot(&self, role: SlotRole) -> Option<&FieldSlot> {
        self.slots.iter().find(|s| s.role == role)
    }

    fn slot_mut(&mut self, role: SlotRole) -> Option<&mut FieldSlot> {
        self.slots.iter_mut().find(|s| s.role == role)
    }

    fn begin_load(&mut self, file: UploadedFile) -> LoadTicket {
        self.generation += 1;
        self.pending = Some(file);
        LoadTicket {
            side: self.side,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.side == self.side && ticket.generation == self.generation
    }

    fn apply(&mut self, ingested: IngestedFile, presets: &RolePresets) {
        self.file = self.pending.take();
        self.header = ingested.header;
        self.body = ingested.body;
        self.state = SlotState::Loaded;
        let columns = self.header.columns().to_vec();
        for slot in &mut self.slots {
            slot.dropdown.set_enabled(true);
            slot.dropdown.populate(&columns);
            let wanted = presets.for_role(slot.role);
            let preset = slot
                .dropdown
                .options()
                .iter()
                .find(|o| !o.is_sentinel() && wanted.contains(&o.value))
                .map(|o| o.value.clone());
            if let Some(value) = preset {
                slot.dropdown.select_value(&value);
            }
            slot.label_active = true;
        }
    }

    fn clear(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.file = None;
        self.state = SlotState::Empty;
        for slot in &mut self.slots {
            slot.dropdown.set_enabled(false);
            slot.label_active = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// One-line message shown in the status area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvancedPanel {
    expanded: bool,
}

impl AdvancedPanel {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }
}

/// Everything the configurator knows; the UI is a projection of this.
#[derive(Debug, Clone)]
pub struct FormState {
    pub access: bool,
    pub coverage: bool,
    pub travel_mode: TravelMode,
    pub max_travel_time: Slider,
    pub decay_function: DecayFunction,
    pub epsilon: Slider,
    pub walk_speed: Slider,
    pub weights: String,
    pub advanced: AdvancedPanel,
    pub notice: Option<Notice>,
    origin: SlotGroup,
    destination: SlotGroup,
    categories: MultiSelect,
    categories_label_active: bool,
    presets: ColumnPresets,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(&FormSettings::default())
    }
}

impl FormState {
    pub fn new(settings: &FormSettings) -> Self {
        Self {
            access: false,
            coverage: false,
            travel_mode: settings.travel_mode,
            max_travel_time: Slider::new(settings.max_travel_time),
            decay_function: settings.decay_function,
            epsilon: Slider::new(settings.epsilon),
            walk_speed: Slider::new(settings.walk_speed),
            weights: String::new(),
            advanced: AdvancedPanel::default(),
            notice: None,
            origin: SlotGroup::new(Side::Origin),
            destination: SlotGroup::new(Side::Destination),
            categories: MultiSelect::new(),
            categories_label_active: false,
            presets: settings.presets.clone(),
        }
    }

    pub fn group(&self, side: Side) -> &SlotGroup {
        match side {
            Side::Origin => &self.origin,
            Side::Destination => &self.destination,
        }
    }

    fn group_mut(&mut self, side: Side) -> &mut SlotGroup {
        match side {
            Side::Origin => &mut self.origin,
            Side::Destination => &mut self.destination,
        }
    }

    pub fn categories(&self) -> &MultiSelect {
        &self.categories
    }

    pub fn categories_label_active(&self) -> bool {
        self.categories_label_active
    }

    /// Start loading a file into a side. Non-text files are refused with a
    /// warning and nothing else changes.
    pub fn select_file(&mut self, side: Side, file: UploadedFile) -> Result<LoadTicket, FormError> {
        if let Err(e) = file.ensure_supported() {
            warn!("Rejected {} file {}: {}", side, file.path.display(), e);
            self.notice = Some(Notice::warning(e.to_string()));
            return Err(e);
        }
        let name = file.name.clone();
        let ticket = self.group_mut(side).begin_load(file);
        debug!("Reading {} file {} (generation {})", side, name, ticket.generation);
        self.notice = Some(Notice::info(format!("Reading {}...", name)));
        Ok(ticket)
    }

    /// Apply a finished read. Completions from superseded selections are dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<IngestedFile, FormError>,
    ) -> LoadOutcome {
        if !self.group(ticket.side).is_current(ticket) {
            debug!(
                "Discarding stale {} load (generation {}, current {})",
                ticket.side,
                ticket.generation,
                self.group(ticket.side).generation()
            );
            return LoadOutcome::Stale;
        }
        match result {
            Err(e) => {
                warn!("Failed to load {} file: {}", ticket.side, e);
                self.group_mut(ticket.side).pending = None;
                self.notice = Some(Notice::warning(e.to_string()));
                LoadOutcome::Failed
            }
            Ok(ingested) => {
                let presets = self.presets.for_side(ticket.side).clone();
                let group = self.group_mut(ticket.side);
                group.apply(ingested, &presets);
                let message = format!(
                    "Loaded {} columns from {}",
                    group.header().len(),
                    group.file().map(|f| f.name.as_str()).unwrap_or("file")
                );
                info!("{} {}", ticket.side, message);
                self.notice = Some(Notice::info(message));
                if ticket.side == Side::Destination {
                    self.refresh_categories();
                }
                LoadOutcome::Applied
            }
        }
    }

    /// The file input was emptied: back to `Empty`, any in-flight read is void.
    pub fn clear_file(&mut self, side: Side) {
        self.group_mut(side).clear();
        if side == Side::Destination {
            self.refresh_categories();
        }
        debug!("Cleared {} file", side);
    }

    pub fn select_slot(&mut self, side: Side, role: SlotRole, index: usize) -> Result<(), FormError> {
        let group = self.group_mut(side);
        if !group.is_loaded() {
            return Err(FormError::NotLoaded { side });
        }
        let slot = group.slot_mut(role).ok_or(FormError::NotLoaded { side })?;
        slot.dropdown.select(index)?;
        if side == Side::Destination && role == SlotRole::Category {
            self.refresh_categories();
        }
        Ok(())
    }

    /// Re-derive the category values from the destination body and the
    /// category-source selection. Replaces any previous values and choices.
    pub fn refresh_categories(&mut self) {
        let (active, set) = match self.destination.slot(SlotRole::Category) {
            Some(slot) if self.destination.is_loaded() && slot.dropdown.selected_value().is_some() => {
                let index = slot.dropdown.selected_index().unwrap_or(0);
                (true, CategoryValueSet::derive(&self.destination.body, index))
            }
            _ => (false, CategoryValueSet::default()),
        };
        self.categories.populate(set.values());
        self.categories.set_enabled(active);
        self.categories_label_active = active;
    }

    pub fn toggle_category_value(&mut self, index: usize) -> Result<(), FormError> {
        if !self.categories.is_enabled() {
            return Err(FormError::NotLoaded {
                side: Side::Destination,
            });
        }
        self.categories.toggle(index)
    }

    pub fn set_access(&mut self, checked: bool) {
        self.access = checked;
    }

    /// Coverage decides whether the population and target slots are shown
    pub fn set_coverage(&mut self, checked: bool) {
        self.coverage = checked;
    }

    pub fn is_role_visible(&self, role: SlotRole) -> bool {
        self.coverage || !role.requires_coverage()
    }

    pub fn visible_slots(&self, side: Side) -> impl Iterator<Item = &FieldSlot> {
        self.group(side)
            .slots()
            .iter()
            .filter(|s| self.is_role_visible(s.role))
    }

    pub fn cycle_travel_mode(&mut self) {
        self.travel_mode = self.travel_mode.next();
    }

    pub fn set_weights(&mut self, text: impl Into<String>) {
        self.weights = text.into();
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::ingest;
    use pretty_assertions::assert_eq;

    fn load(form: &mut FormState, side: Side, name: &str, text: &str) -> LoadOutcome {
        let ticket = form.select_file(side, UploadedFile::from_path(name)).unwrap();
        form.complete_load(ticket, Ok(ingest(text)))
    }

    #[test]
    fn test_initial_state_disabled() {
        let form = FormState::default();
        for side in [Side::Origin, Side::Destination] {
            let group = form.group(side);
            assert_eq!(group.state(), SlotState::Empty);
            assert!(group.slots().iter().all(|s| !s.dropdown.is_enabled() && !s.label_active));
        }
        assert!(!form.categories().is_enabled());
        assert_eq!(form.epsilon.value(), 0.0);
    }

    #[test]
    fn test_load_populates_every_slot_with_same_header() {
        let mut form = FormState::default();
        assert_eq!(load(&mut form, Side::Origin, "o.csv", "id,lat,lon,pop\n1,2,3,4"), LoadOutcome::Applied);
        let group = form.group(Side::Origin);
        assert!(group.is_loaded());
        for slot in group.slots() {
            assert!(slot.dropdown.is_enabled());
            assert!(slot.label_active);
            assert_eq!(slot.dropdown.option_values(), vec!["id", "lat", "lon", "pop"]);
        }
    }

    #[test]
    fn test_unsupported_file_leaves_state() {
        let mut form = FormState::default();
        load(&mut form, Side::Origin, "o.csv", "a,b");
        let before = form.group(Side::Origin).slots().to_vec();
        let generation = form.group(Side::Origin).generation();
        assert!(form.select_file(Side::Origin, UploadedFile::from_path("x.pdf")).is_err());
        assert_eq!(form.group(Side::Origin).slots(), before.as_slice());
        assert_eq!(form.group(Side::Origin).generation(), generation);
        assert_eq!(form.notice.as_ref().map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut form = FormState::default();
        let first = form.select_file(Side::Origin, UploadedFile::from_path("a.csv")).unwrap();
        let second = form.select_file(Side::Origin, UploadedFile::from_path("b.csv")).unwrap();
        assert_eq!(form.complete_load(second, Ok(ingest("b1,b2"))), LoadOutcome::Applied);
        assert_eq!(form.complete_load(first, Ok(ingest("a1,a2"))), LoadOutcome::Stale);
        let group = form.group(Side::Origin);
        assert_eq!(group.file().map(|f| f.name.as_str()), Some("b.csv"));
        assert_eq!(group.header().columns(), &["b1", "b2"]);
    }

    #[test]
    fn test_clear_voids_inflight_read() {
        let mut form = FormState::default();
        let ticket = form.select_file(Side::Origin, UploadedFile::from_path("a.csv")).unwrap();
        form.clear_file(Side::Origin);
        assert_eq!(form.complete_load(ticket, Ok(ingest("a,b"))), LoadOutcome::Stale);
        assert_eq!(form.group(Side::Origin).state(), SlotState::Empty);
    }

    #[test]
    fn test_failed_read_keeps_prior_load() {
        let mut form = FormState::default();
        load(&mut form, Side::Destination, "d.csv", "id,kind\nA,x");
        let ticket = form.select_file(Side::Destination, UploadedFile::from_path("gone.csv")).unwrap();
        let err = FormError::Read {
            path: "gone.csv".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(form.complete_load(ticket, Err(err)), LoadOutcome::Failed);
        let group = form.group(Side::Destination);
        assert!(group.is_loaded());
        assert!(group.pending().is_none());
        assert_eq!(group.file().map(|f| f.name.as_str()), Some("d.csv"));
    }

    #[test]
    fn test_category_selection_drives_values() {
        let mut form = FormState::default();
        load(&mut form, Side::Destination, "d.csv", "id,cat,kind\nA,1,x\nB,2,y\nC,1,x");
        assert!(!form.categories().is_enabled());
        assert!(!form.categories_label_active());

        form.select_slot(Side::Destination, SlotRole::Category, 2).unwrap();
        assert!(form.categories().is_enabled());
        assert!(form.categories_label_active());
        assert_eq!(form.categories().options(), &["1", "2"]);

        form.select_slot(Side::Destination, SlotRole::Category, 0).unwrap();
        assert!(!form.categories().is_enabled());
        assert!(form.categories().is_empty());
    }

    #[test]
    fn test_presets_preselect_columns() {
        let mut settings = FormSettings::default();
        settings.presets.destination.latitude = vec!["lat".to_string()];
        settings.presets.destination.category = vec!["category".to_string()];
        let mut form = FormState::new(&settings);
        load(&mut form, Side::Destination, "d.csv", "ID,category,lon,lat\n1,school,0,0");
        let group = form.group(Side::Destination);
        let lat = group.slot(SlotRole::Latitude).unwrap();
        assert_eq!(lat.dropdown.selected_value(), Some("lat"));
        let unique = group.slot(SlotRole::UniqueId).unwrap();
        assert_eq!(unique.dropdown.selected_index(), Some(0));
        assert_eq!(form.categories().options(), &["school"]);
    }

    #[test]
    fn test_preset_picks_first_matching_column() {
        let mut settings = FormSettings::default();
        settings.presets.origin.longitude = vec!["long".to_string(), "lon".to_string()];
        let mut form = FormState::new(&settings);
        // header order decides, not preset order; duplicates resolve to the first
        load(&mut form, Side::Origin, "o.csv", "id,lon,long,lon
1,2,3,4");
        let lon = form.group(Side::Origin).slot(SlotRole::Longitude).unwrap();
        assert_eq!(lon.dropdown.selected_index(), Some(1));
        assert_eq!(lon.dropdown.selected_value(), Some("lon"));
    }

    #[test]
    fn test_select_slot_requires_loaded() {
        let mut form = FormState::default();
        assert!(matches!(
            form.select_slot(Side::Origin, SlotRole::Latitude, 0),
            Err(FormError::NotLoaded { side: Side::Origin })
        ));
    }

    #[test]
    fn test_coverage_controls_visibility() {
        let mut form = FormState::default();
        assert_eq!(form.visible_slots(Side::Origin).count(), 3);
        form.set_coverage(true);
        assert_eq!(form.visible_slots(Side::Origin).count(), 4);
        assert!(form.is_role_visible(SlotRole::Target));
    }

    #[test]
    fn test_slider_snaps_and_clamps() {
        let mut slider = Slider::new(SliderSpec {
            default: 0.0,
            min: 0.0,
            max: 1.0,
            step: 0.05,
        });
        for _ in 0..3 {
            slider.increment();
        }
        assert_eq!(slider.value(), 0.15);
        assert_eq!(slider.display(), "0.15");
        slider.set(7.0);
        assert_eq!(slider.value(), 1.0);
        slider.decrement();
        slider.set(-3.0);
        assert_eq!(slider.value(), 0.0);
    }

    #[test]
    fn test_advanced_panel_toggle() {
        let mut panel = AdvancedPanel::default();
        panel.toggle();
        assert!(panel.is_expanded());
        panel.toggle();
        assert!(!panel.is_expanded());
    }
}
