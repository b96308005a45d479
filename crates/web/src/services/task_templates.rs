//! Ready-made maintenance tasks offered by the create-task page.

use homecare_core::{Area, Category, Cost, Frequency, Priority};

/// A prefill for the create-task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub priority: Priority,
    /// Whole dollars.
    pub estimated_cost: u32,
    pub frequency: Frequency,
    pub room: Area,
    pub tips: &'static str,
}

impl TaskTemplate {
    #[must_use]
    pub fn cost(&self) -> Cost {
        Cost::dollars(self.estimated_cost)
    }
}

const TEMPLATES: [TaskTemplate; 6] = [
    TaskTemplate {
        id: "hvac_filter",
        title: "Replace HVAC Filter",
        description: "Replace air filter for better air quality and system efficiency",
        category: Category::HeatingCooling,
        priority: Priority::Medium,
        estimated_cost: 25,
        frequency: Frequency::Monthly,
        room: Area::Basement,
        tips: "Check filter monthly, replace every 1-3 months depending on usage",
    },
    TaskTemplate {
        id: "gutter_cleaning",
        title: "Clean Gutters",
        description: "Remove debris and check for damage to prevent water issues",
        category: Category::Maintenance,
        priority: Priority::High,
        estimated_cost: 150,
        frequency: Frequency::Seasonal,
        room: Area::Exterior,
        tips: "Best done in fall after leaves drop and spring before heavy rains",
    },
    TaskTemplate {
        id: "smoke_detector",
        title: "Test Smoke Detectors",
        description: "Test batteries and functionality of all smoke detectors",
        category: Category::Safety,
        priority: Priority::High,
        estimated_cost: 0,
        frequency: Frequency::Monthly,
        room: Area::WholeHome,
        tips: "Replace batteries twice yearly when daylight saving time changes",
    },
    TaskTemplate {
        id: "deep_clean",
        title: "Deep Clean Kitchen",
        description: "Thorough cleaning of appliances, cabinets, and surfaces",
        category: Category::Cleaning,
        priority: Priority::Medium,
        estimated_cost: 0,
        frequency: Frequency::Monthly,
        room: Area::Kitchen,
        tips: "Include cleaning inside oven, refrigerator coils, and range hood",
    },
    TaskTemplate {
        id: "lawn_care",
        title: "Fertilize Lawn",
        description: "Apply seasonal fertilizer for healthy grass growth",
        category: Category::Landscaping,
        priority: Priority::Medium,
        estimated_cost: 45,
        frequency: Frequency::Seasonal,
        room: Area::Yard,
        tips: "Apply in early spring and fall for best results",
    },
    TaskTemplate {
        id: "plumbing_check",
        title: "Check Water Pressure",
        description: "Test water pressure in all faucets and showerheads",
        category: Category::Plumbing,
        priority: Priority::Low,
        estimated_cost: 0,
        frequency: Frequency::Quarterly,
        room: Area::Bathroom,
        tips: "Low pressure may indicate clogged aerators or pipe issues",
    },
];

#[must_use]
pub const fn all() -> &'static [TaskTemplate] {
    &TEMPLATES
}

#[must_use]
pub fn find(id: &str) -> Option<&'static TaskTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}
