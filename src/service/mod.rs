pub mod record;
pub mod views;

pub use record::*;
pub use views::*;

use std::sync::Arc;

use crate::model::{AttendanceRecord, ClassSection, Entity, Grade, Student};
use crate::store::traits::StorageAdapter;

/// The four record services over one shared store.
#[derive(Clone)]
pub struct SchoolServices {
    pub students: RecordService<Student>,
    pub classes: RecordService<ClassSection>,
    pub grades: RecordService<Grade>,
    pub attendance: RecordService<AttendanceRecord>,
}

impl SchoolServices {
    pub fn new(store: Arc<dyn StorageAdapter>) -> Self {
        Self {
            students: RecordService::new(Arc::clone(&store)),
            classes: RecordService::new(Arc::clone(&store)),
            grades: RecordService::new(Arc::clone(&store)),
            attendance: RecordService::new(store),
        }
    }
}

/// Picks the service for an entity out of [`SchoolServices`].
pub trait Resource: Entity {
    fn service(services: &SchoolServices) -> &RecordService<Self>;
}

impl Resource for Student {
    fn service(services: &SchoolServices) -> &RecordService<Self> {
        &services.students
    }
}

impl Resource for ClassSection {
    fn service(services: &SchoolServices) -> &RecordService<Self> {
        &services.classes
    }
}

impl Resource for Grade {
    fn service(services: &SchoolServices) -> &RecordService<Self> {
        &services.grades
    }
}

impl Resource for AttendanceRecord {
    fn service(services: &SchoolServices) -> &RecordService<Self> {
        &services.attendance
    }
}
