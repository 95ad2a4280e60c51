use crate::domain::profile::entities::{ApproxLocation, ProfileStatus, Visibility};

pub const DEFAULT_PSEUDO: &str = "Guerrière_Rose";
pub const DEFAULT_DIET_TAG: &str = "Sans gluten";

#[derive(Debug, Clone)]
pub struct OnboardingInput {
    pub pseudo: Option<String>,
    pub status: ProfileStatus,
    pub diet_tags: Option<Vec<String>>,
    pub location: Option<ApproxLocation>,
}

impl Default for OnboardingInput {
    fn default() -> Self {
        Self {
            pseudo: None,
            status: ProfileStatus::Diagnosed,
            diet_tags: None,
            location: None,
        }
    }
}

/// Profile edits applied in one step. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub pseudo: Option<String>,
    pub avatar_url: Option<String>,
    pub status: Option<ProfileStatus>,
    pub visibility: Option<Visibility>,
    pub household_size: Option<u32>,
    pub household_delta: Option<i32>,
    pub toggle_diet_tags: Vec<String>,
    pub add_diet_tags: Vec<String>,
    pub remove_diet_tags: Vec<String>,
    pub add_excluded_ingredients: Vec<String>,
    pub remove_excluded_ingredients: Vec<String>,
}

impl UpdateProfileInput {
    pub fn is_empty(&self) -> bool {
        self.pseudo.is_none()
            && self.avatar_url.is_none()
            && self.status.is_none()
            && self.visibility.is_none()
            && self.household_size.is_none()
            && self.household_delta.is_none()
            && self.toggle_diet_tags.is_empty()
            && self.add_diet_tags.is_empty()
            && self.remove_diet_tags.is_empty()
            && self.add_excluded_ingredients.is_empty()
            && self.remove_excluded_ingredients.is_empty()
    }
}
