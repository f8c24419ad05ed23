use roster_core::db::open_db_in_memory;
use roster_core::{
    CrudRepository, Item, Member, MemberDto, ModelError, SqliteTeamRepository, Team,
};
use uuid::Uuid;

#[test]
fn member_new_sets_defaults() {
    let member = Member::new("memberA");

    assert_eq!(member.id(), None);
    assert!(member.is_new());
    assert_eq!(member.username, "memberA");
    assert_eq!(member.age, 0);
    assert_eq!(member.team_id(), None);
    assert_eq!(member.created_at(), None);
}

#[test]
fn member_cannot_reference_transient_team() {
    let team = Team::new("teamA");

    let err = Member::with_team("member1", 10, &team).unwrap_err();
    assert_eq!(err, ModelError::TransientTeam);

    let mut member = Member::new("member1");
    assert_eq!(member.change_team(&team), Err(ModelError::TransientTeam));
    assert_eq!(member.team_id(), None);
}

#[test]
fn member_change_team_and_leave_team() {
    let conn = open_db_in_memory().unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();

    let mut member = Member::with_team("member1", 10, &team_a).unwrap();
    assert_eq!(member.team_id(), team_a.id());

    member.change_team(&team_b).unwrap();
    assert_eq!(member.team_id(), team_b.id());

    member.leave_team();
    assert_eq!(member.team_id(), None);
}

#[test]
fn validation_rejects_blank_names_and_negative_age() {
    assert_eq!(Member::new("  ").validate(), Err(ModelError::BlankUsername));
    assert_eq!(
        Member::with_age("member1", -1).validate(),
        Err(ModelError::NegativeAge(-1))
    );
    assert_eq!(Team::new("").validate(), Err(ModelError::BlankTeamName));
    assert!(Member::with_age("member1", 0).validate().is_ok());
}

#[test]
fn item_identity_and_newness() {
    let item = Item::new();
    assert!(!item.id().is_nil());
    assert!(item.is_new());

    let fixed = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    assert_eq!(Item::with_id(fixed).unwrap().id(), fixed);
    assert_eq!(Item::with_id(Uuid::nil()).unwrap_err(), ModelError::NilItemId);
}

#[test]
fn member_dto_serialization_uses_expected_wire_fields() {
    let dto = MemberDto::new(7, "AAA", None);

    let json = serde_json::to_value(&dto).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["username"], "AAA");
    assert!(json["team_name"].is_null());

    let decoded: MemberDto = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, dto);
}

#[test]
fn member_dto_from_transient_member_is_none() {
    let member = Member::new("memberA");
    assert!(MemberDto::from_member(&member, None).is_none());
}
