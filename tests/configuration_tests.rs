/// Configuration tests
///
/// Registration kinds and their failure modes
/// Run with: cargo test --test configuration_tests


use entities::*;
use entitymapper::{EntityMapper, MapperError, MapperExt, MapperHandle};
use std::time::Duration;

#[test]
fn test_good_configuration() {
    let mapper = EntityMapper::new();
    mapper.register(user_to_dto).unwrap();

    let dto: UserDto = mapper.map(user(10, "Nikita")).unwrap();

    assert_eq!(dto.id, 10);
    assert_eq!(dto.name, "Nikita");
}

#[test]
fn test_missing_configuration() {
    let mapper = EntityMapper::new();

    let err = mapper.map::<User, UserDto>(user(10, "Nikita")).unwrap_err();

    assert!(matches!(err, MapperError::MissingConfiguration(..)));
    assert_eq!(err.to_string(), missing_message::<User, UserDto>());
    assert!(err.to_string().contains("entities::User and "));
}

#[test]
fn test_disposable_missing_configuration() {
    let mapper = EntityMapper::new();
    mapper.register_once(user_to_dto).unwrap();

    let dto: UserDto = mapper.map(user(10, "Nikita")).unwrap();
    let err = mapper.map::<User, UserDto>(user(10, "Nikita")).unwrap_err();

    assert_eq!(dto.name, "Nikita");
    assert_eq!(err.to_string(), missing_message::<User, UserDto>());
    assert!(!mapper.contains::<User, UserDto>().unwrap());
}

#[test]
fn test_disposable_slot_can_be_registered_again() {
    let mapper = EntityMapper::new();
    mapper.register_once(user_to_dto).unwrap();
    let _: UserDto = mapper.map(user(1, "first")).unwrap();

    mapper.register_once(user_to_dto).unwrap();
    let second: UserDto = mapper.map(user(2, "second")).unwrap();
    assert_eq!(second.name, "second");
}

#[test]
fn test_duplicate_configuration() {
    let mapper = EntityMapper::new();
    mapper.register(user_to_dto).unwrap();

    let err = mapper.register_once(user_to_dto).unwrap_err();
    assert!(matches!(err, MapperError::DuplicateMapping(..)));

    // the original reusable entry is untouched
    let _: UserDto = mapper.map(user(1, "a")).unwrap();
    let _: UserDto = mapper.map(user(2, "b")).unwrap();
}

#[tokio::test]
async fn test_bad_async_configuration() {
    let handle = MapperHandle::default();
    handle.register(strange_to_dto).unwrap();
    let capability = handle.capability();

    let err = capability
        .map_async::<UserStrange, UserDtoStrange>(strange_user())
        .await
        .unwrap_err();

    assert!(handle.is_same(&capability));
    assert_eq!(err.to_string(), "Is Not Async Configuration");
    // the synchronous entry is neither invoked nor removed
    let dto: UserDtoStrange = handle.map(strange_user()).unwrap();
    assert_eq!(dto.full_name, "Nikita Okhotnikov");
}

#[tokio::test]
async fn test_good_async_configuration() {
    let handle = MapperHandle::default();
    handle
        .register_async(|user: UserStrange| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            strange_to_dto(user)
        })
        .unwrap();
    let capability = handle.capability();

    let dto: UserDtoStrange = capability.map_async(strange_user()).await.unwrap();

    assert!(handle.is_same(&capability));
    assert_eq!(dto.id, 25);
    assert_eq!(dto.full_name, "Nikita Okhotnikov");
}

#[tokio::test]
async fn test_async_missing_configuration() {
    let mapper = EntityMapper::new();

    let err = mapper
        .map_async::<User, UserDto>(user(25, "Nikita"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), missing_message::<User, UserDto>());
}

#[tokio::test]
async fn test_sync_map_on_async_configuration() {
    let mapper = EntityMapper::new();
    mapper
        .register_async(|user: User| async move { user_to_dto(user) })
        .unwrap();

    let err = mapper.map::<User, UserDto>(user(1, "x")).unwrap_err();
    assert!(matches!(err, MapperError::NotSyncConfiguration));

    let dto: UserDto = mapper.map_async(user(1, "x")).await.unwrap();
    assert_eq!(dto.id, 1);
}

#[tokio::test]
async fn test_async_disposable_configuration() {
    let mapper = EntityMapper::new();
    mapper
        .register_async_once(|user: User| async move { user_to_dto(user) })
        .unwrap();

    let dto: UserDto = mapper.map_async(user(7, "once")).await.unwrap();
    let err = mapper
        .map_async::<User, UserDto>(user(7, "once"))
        .await
        .unwrap_err();

    assert_eq!(dto.name, "once");
    assert!(matches!(err, MapperError::MissingConfiguration(..)));
}
