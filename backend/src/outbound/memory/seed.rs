//! Demo campus loaded by [`MemoryBackend::seeded`](super::MemoryBackend::seeded).

use crate::domain::{
    Building, BuildingId, Course, CourseId, Group, GroupId, TestId, TestScope, TestSummary,
};

use super::MemoryBackend;

const BUILDINGS: [(i64, &str); 3] = [(1, "Главный корпус"), (2, "Корпус 2"), (3, "СП-1")];

/// Invite code accepted by the demo backend.
pub const DEMO_INVITE_CODE: &str = "DEMO-TEACHER-2024";

pub(super) fn demo_campus(mut backend: MemoryBackend) -> MemoryBackend {
    for (building_id, name) in BUILDINGS {
        let building = BuildingId::new(building_id);
        backend = backend.with_building(Building::new(building, name));
        // Every building offers four courses; visibility rules hide some.
        for course_number in 1..=4_u8 {
            let course_id = CourseId::new(building_id * 10 + i64::from(course_number));
            backend = backend.with_course(Course {
                id: course_id,
                building_id: building,
                course_number,
            });
            for index in 1..=2_u16 {
                backend = backend.with_group(Group {
                    id: GroupId::new(course_id.get() * 10 + i64::from(index)),
                    course_id,
                    group_number: u16::from(course_number) * 100 + index,
                });
            }
        }
        backend = backend.with_test(
            TestScope::Building(building),
            TestSummary {
                id: TestId::new(building_id * 1000),
                title: format!("{name}: вводный тест"),
                question_count: 10,
            },
        );
    }

    backend
        .with_test(
            TestScope::Group(GroupId::new(121)),
            TestSummary {
                id: TestId::new(1),
                title: "Алгебра".to_owned(),
                question_count: 12,
            },
        )
        .with_test(
            TestScope::Group(GroupId::new(121)),
            TestSummary {
                id: TestId::new(2),
                title: "Геометрия".to_owned(),
                question_count: 8,
            },
        )
        .with_invite(DEMO_INVITE_CODE, None)
}
