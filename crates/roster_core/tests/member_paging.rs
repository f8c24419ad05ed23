use roster_core::db::open_db_in_memory;
use roster_core::{
    CrudRepository, Direction, Member, MemberDto, MemberField, MemberRepository, PageRequest,
    Sort, SqliteMemberRepository,
};
use rusqlite::Connection;

fn seed_ten_members(conn: &Connection) {
    let repo = SqliteMemberRepository::try_new(conn).unwrap();
    for index in 1..=10 {
        let age = if index <= 5 { 10 } else { 11 };
        repo.save(&Member::with_age(format!("member{index}"), age))
            .unwrap();
    }
}

fn by_username_desc(page: u32, size: u32) -> PageRequest<MemberField> {
    PageRequest::of(page, size).with_sort(Sort::by(Direction::Desc, MemberField::Username))
}

#[test]
fn first_page_by_age_reports_totals() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo.find_page_by_age(10, &by_username_desc(0, 3)).unwrap();

    let names: Vec<&str> = page.content().iter().map(|m| m.username.as_str()).collect();
    assert_eq!(names, vec!["member5", "member4", "member3"]);
    assert_eq!(page.number_of_elements(), 3);
    assert_eq!(page.total_elements(), 5);
    assert_eq!(page.number(), 0);
    assert_eq!(page.total_pages(), 2);
    assert!(page.is_first());
    assert!(page.has_next());
    assert!(!page.has_previous());
}

#[test]
fn last_page_by_age_is_partial() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let request = by_username_desc(0, 3).next();
    let page = repo.find_page_by_age(10, &request).unwrap();

    assert_eq!(page.number(), 1);
    assert_eq!(page.number_of_elements(), 2);
    assert!(page.is_last());
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn slice_by_age_skips_count_but_knows_next() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let first = repo.find_slice_by_age(10, &by_username_desc(0, 3)).unwrap();
    assert_eq!(first.content().len(), 3);
    assert!(first.has_next());
    assert!(first.is_first());

    let second = repo.find_slice_by_age(10, &by_username_desc(1, 3)).unwrap();
    assert_eq!(second.content().len(), 2);
    assert!(!second.has_next());
    assert!(second.is_last());
}

#[test]
fn offset_limit_window_and_total_count() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let first = repo.find_by_page(10, 0, 3).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].username, "member5");
    assert_eq!(repo.total_count(10).unwrap(), 5);

    assert_eq!(repo.find_by_page(10, 3, 3).unwrap().len(), 2);
    assert!(repo.find_by_page(10, 10, 3).unwrap().is_empty());
}

#[test]
fn zero_page_size_falls_back_to_default() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo.find_page(&PageRequest::of(0, 0)).unwrap();
    assert_eq!(page.size(), 20);
    assert_eq!(page.number_of_elements(), 10);
    assert_eq!(page.total_pages(), 1);
    assert!(page.is_first() && page.is_last());
}

#[test]
fn page_map_shapes_members_into_dtos() {
    let conn = open_db_in_memory().unwrap();
    seed_ten_members(&conn);
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo.find_page_by_age(11, &by_username_desc(0, 2)).unwrap();
    let dtos = page.map(|member| {
        MemberDto::new(member.id().unwrap_or_default(), member.username, None)
    });

    assert_eq!(dtos.total_elements(), 5);
    assert_eq!(dtos.content()[0].username, "member9");
    assert_eq!(dtos.content()[1].username, "member8");
    assert!(dtos.content().iter().all(|dto| dto.team_name.is_none()));
}
