#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Departments,
    Agents,
    Card,
}

impl FocusArea {
    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Departments => "Departments",
            FocusArea::Agents => "Agents",
            FocusArea::Card => "Agent Card",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FocusArea::Departments => FocusArea::Agents,
            FocusArea::Agents => FocusArea::Card,
            FocusArea::Card => FocusArea::Departments,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FocusArea::Departments => FocusArea::Card,
            FocusArea::Agents => FocusArea::Departments,
            FocusArea::Card => FocusArea::Agents,
        }
    }
}

/// Fields of the agent creation form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    TriggerType,
    ReturnType,
    WebhookUrl,
    WorkflowUrl,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Description,
        FormField::TriggerType,
        FormField::ReturnType,
        FormField::WebhookUrl,
        FormField::WorkflowUrl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::TriggerType => "Trigger",
            FormField::ReturnType => "Returns",
            FormField::WebhookUrl => "Webhook URL",
            FormField::WorkflowUrl => "Workflow URL",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, FormField::TriggerType | FormField::ReturnType)
    }

    pub fn step(&self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let index = Self::ALL.iter().position(|field| field == self).unwrap_or(0) as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}
