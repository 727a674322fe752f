/// Hub lifecycle. Moves to `Listening` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HubState {
    #[default]
    Uninitialized,
    Listening,
}
