//! Entity kinds and their field rules. The rule tables are the single source for
//! required fields, value types and foreign keys (and therefore delete dependents).

/// One of the four record collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Teacher,
    Course,
    Student,
    Test,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    /// Non-empty string.
    Text,
    Email,
    Integer { min: i64 },
    /// JSON number; `exclusive` makes `min` a strict lower bound.
    Number { min: f64, exclusive: bool },
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Integer id that must resolve to a record of the given kind.
    Reference(EntityKind),
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }
}

const NON_NEGATIVE: FieldKind = FieldKind::Number { min: 0.0, exclusive: false };
const POSITIVE: FieldKind = FieldKind::Number { min: 0.0, exclusive: true };

const TEACHER_RULES: &[FieldRule] = &[
    FieldRule::required("firstName", FieldKind::Text),
    FieldRule::required("lastName", FieldKind::Text),
    FieldRule::required("email", FieldKind::Email),
    FieldRule::required("department", FieldKind::Text),
    FieldRule::optional("room", FieldKind::Text),
];

const COURSE_RULES: &[FieldRule] = &[
    FieldRule::required("code", FieldKind::Text),
    FieldRule::required("name", FieldKind::Text),
    FieldRule::required("teacherId", FieldKind::Reference(EntityKind::Teacher)),
    FieldRule::required("semester", FieldKind::Text),
    FieldRule::required("room", FieldKind::Text),
    FieldRule::optional("schedule", FieldKind::Text),
];

const STUDENT_RULES: &[FieldRule] = &[
    FieldRule::required("firstName", FieldKind::Text),
    FieldRule::required("lastName", FieldKind::Text),
    FieldRule::required("grade", FieldKind::Integer { min: 0 }),
    FieldRule::required("studentNumber", FieldKind::Text),
    FieldRule::optional("homeroom", FieldKind::Text),
];

const TEST_RULES: &[FieldRule] = &[
    FieldRule::required("studentId", FieldKind::Reference(EntityKind::Student)),
    FieldRule::required("courseId", FieldKind::Reference(EntityKind::Course)),
    FieldRule::required("testName", FieldKind::Text),
    FieldRule::required("date", FieldKind::Date),
    FieldRule::required("mark", NON_NEGATIVE),
    FieldRule::required("outOf", POSITIVE),
    FieldRule::optional("weight", NON_NEGATIVE),
];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Teacher,
        EntityKind::Course,
        EntityKind::Student,
        EntityKind::Test,
    ];

    /// Collection name: route segment, file stem and table name.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Teacher => "teachers",
            EntityKind::Course => "courses",
            EntityKind::Student => "students",
            EntityKind::Test => "tests",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EntityKind::Teacher => "Teacher",
            EntityKind::Course => "Course",
            EntityKind::Student => "Student",
            EntityKind::Test => "Test record",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            EntityKind::Teacher => "teacher",
            EntityKind::Course => "course",
            EntityKind::Student => "student",
            EntityKind::Test => "test",
        }
    }

    pub fn rules(self) -> &'static [FieldRule] {
        match self {
            EntityKind::Teacher => TEACHER_RULES,
            EntityKind::Course => COURSE_RULES,
            EntityKind::Student => STUDENT_RULES,
            EntityKind::Test => TEST_RULES,
        }
    }

    pub fn rule(self, field: &str) -> Option<&'static FieldRule> {
        self.rules().iter().find(|r| r.name == field)
    }

    /// Foreign-key fields declared by this kind, with their target kind.
    pub fn references(self) -> impl Iterator<Item = (&'static str, EntityKind)> {
        self.rules().iter().filter_map(|r| match r.kind {
            FieldKind::Reference(target) => Some((r.name, target)),
            _ => None,
        })
    }

    /// Kinds (and their FK field) whose records may point at a record of this kind.
    pub fn dependents(self) -> Vec<(EntityKind, &'static str)> {
        EntityKind::ALL
            .iter()
            .flat_map(|&other| {
                other
                    .references()
                    .filter(move |(_, target)| *target == self)
                    .map(move |(field, _)| (other, field))
            })
            .collect()
    }

    pub fn not_found_message(self) -> String {
        format!("{} not found", self.display_name())
    }

    pub fn invalid_reference_message(self, field: &str) -> String {
        format!("Invalid {}: {} not found", field, self.noun())
    }

    pub fn delete_conflict_message(self, dependent: EntityKind) -> String {
        format!(
            "Cannot delete {} with existing {} records",
            self.noun(),
            dependent.noun()
        )
    }
}
