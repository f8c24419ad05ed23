use roster_core::db::open_db_in_memory;
use roster_core::{
    CrudRepository, Direction, Member, ModelError, PageRequest, RepoError, Sort,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamField, TeamRepository,
};

#[test]
fn save_find_and_count_teams() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::try_new(&conn).unwrap();

    let team_a = repo.save(&Team::new("teamA")).unwrap();
    let team_b = repo.save(&Team::new("teamB")).unwrap();

    assert!(team_a.id().is_some());
    assert_eq!(repo.find_by_id(team_a.id().unwrap()).unwrap(), Some(team_a.clone()));
    assert!(repo.exists_by_id(team_b.id().unwrap()).unwrap());
    assert_eq!(repo.find_all().unwrap(), vec![team_a, team_b]);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn rename_keeps_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::try_new(&conn).unwrap();

    let mut team = repo.save(&Team::new("teamA")).unwrap();
    team.name = "renamed".to_string();
    let renamed = repo.save(&team).unwrap();

    assert_eq!(renamed.id(), team.id());
    assert_eq!(renamed.name, "renamed");
    assert!(repo.find_by_name("teamA").unwrap().is_empty());
    assert_eq!(repo.find_by_name("renamed").unwrap(), vec![renamed]);
}

#[test]
fn blank_team_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::try_new(&conn).unwrap();

    let err = repo.save(&Team::new("  ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ModelError::BlankTeamName)));
}

#[test]
fn find_members_is_explicit_back_reference() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();
    members
        .save(&Member::with_team("member1", 10, &team_a).unwrap())
        .unwrap();
    members
        .save(&Member::with_team("member2", 20, &team_a).unwrap())
        .unwrap();
    members
        .save(&Member::with_team("member3", 30, &team_b).unwrap())
        .unwrap();

    let of_a: Vec<String> = teams
        .find_members(&team_a)
        .unwrap()
        .into_iter()
        .map(|m| m.username)
        .collect();
    assert_eq!(of_a, vec!["member1", "member2"]);
    assert_eq!(teams.find_members(&team_b).unwrap().len(), 1);
    assert!(teams.find_members(&Team::new("transient")).unwrap().is_empty());
}

#[test]
fn moving_member_between_teams() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();
    let mut member = members
        .save(&Member::with_team("member1", 10, &team_a).unwrap())
        .unwrap();

    member.change_team(&team_b).unwrap();
    let member = members.save(&member).unwrap();

    assert_eq!(member.team_id(), team_b.id());
    assert!(teams.find_members(&team_a).unwrap().is_empty());
    assert_eq!(teams.find_members(&team_b).unwrap(), vec![member]);
}

#[test]
fn deleting_referenced_team_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();

    let team = teams.save(&Team::new("teamA")).unwrap();
    let mut member = members
        .save(&Member::with_team("member1", 10, &team).unwrap())
        .unwrap();

    let err = teams.delete(&team).unwrap_err();
    assert!(
        matches!(&err, RepoError::Db(db) if db.is_constraint_violation()),
        "unexpected error: {err}"
    );
    assert_eq!(teams.count().unwrap(), 1);
    assert_eq!(members.count().unwrap(), 1);

    member.leave_team();
    members.save(&member).unwrap();
    teams.delete(&team).unwrap();
    teams.delete(&team).unwrap();
    assert_eq!(teams.count().unwrap(), 0);
}

#[test]
fn team_page_sorted_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::try_new(&conn).unwrap();
    for name in ["gamma", "alpha", "beta"] {
        repo.save(&Team::new(name)).unwrap();
    }

    let request =
        PageRequest::of(0, 2).with_sort(Sort::by(Direction::Asc, TeamField::Name));
    let page = repo.find_page(&request).unwrap();
    let names: Vec<&str> = page.content().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert_eq!(page.total_elements(), 3);
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn deserialized_team_is_transient() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTeamRepository::try_new(&conn).unwrap();

    let decoded: Team =
        serde_json::from_str(r#"{"id":9223372036854775807,"name":"imported"}"#).unwrap();
    assert!(decoded.is_new());

    let saved = repo.save(&decoded).unwrap();
    assert_ne!(saved.id(), Some(i64::MAX));
    assert!(repo.save(&Team::new("next")).unwrap().id() > saved.id());
}
