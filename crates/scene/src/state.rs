//! Two-slot application state. Each asset arrives once; a failure is final.

use asset::{LoadError, MeshBundle, TextureData};

/// Completion of one loader.
#[derive(Debug)]
pub enum AppEvent {
    TextureLoaded(Result<TextureData, LoadError>),
    MeshLoaded(Result<MeshBundle, LoadError>),
}

/// Progress of one asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Slot<T> {
    #[default]
    Pending,
    Loaded(T),
    /// Load failed; the value is gone for good.
    Failed,
}

impl<T> Slot<T> {
    /// Only a pending slot accepts a result.
    fn settle<E>(self, result: Result<T, E>) -> Self {
        match self {
            Slot::Pending => match result {
                Ok(value) => Slot::Loaded(value),
                Err(_) => Slot::Failed,
            },
            settled => settled,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppState {
    /// At least one asset is not (or never will be) available.
    Incomplete {
        texture: Slot<TextureData>,
        mesh: Slot<MeshBundle>,
    },
    Ready {
        texture: TextureData,
        mesh: MeshBundle,
    },
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Incomplete {
            texture: Slot::Pending,
            mesh: Slot::Pending,
        }
    }
}

impl AppState {
    /// Apply one loader completion.
    pub fn update(self, event: AppEvent) -> AppState {
        let (texture, mesh) = match self {
            ready @ AppState::Ready { .. } => return ready,
            AppState::Incomplete { texture, mesh } => match event {
                AppEvent::TextureLoaded(result) => (texture.settle(result), mesh),
                AppEvent::MeshLoaded(result) => (texture, mesh.settle(result)),
            },
        };

        match (texture, mesh) {
            (Slot::Loaded(texture), Slot::Loaded(mesh)) => AppState::Ready { texture, mesh },
            (texture, mesh) => AppState::Incomplete { texture, mesh },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AppState::Ready { .. })
    }

    /// True once some asset has failed; the state can never become ready.
    pub fn is_stuck(&self) -> bool {
        match self {
            AppState::Incomplete { texture, mesh } => texture.is_failed() || mesh.is_failed(),
            AppState::Ready { .. } => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use asset::{DecodeError, MeshData, MeshVertex, ShadowVolume};

    use super::*;

    pub(crate) fn texture() -> TextureData {
        TextureData::white()
    }

    pub(crate) fn bundle(guns: usize) -> MeshBundle {
        let tri = MeshData::new(
            vec![
                MeshVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                MeshVertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                MeshVertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2],
        );
        MeshBundle {
            primary: tri.clone(),
            shadow: ShadowVolume::default(),
            guns: vec![tri; guns],
        }
    }

    fn failure() -> LoadError {
        LoadError::Decode(DecodeError::MissingObject("body"))
    }

    fn run(events: Vec<AppEvent>) -> AppState {
        events
            .into_iter()
            .fold(AppState::default(), |state, event| state.update(event))
    }

    #[test]
    fn starts_incomplete() {
        let state = AppState::default();
        assert!(!state.is_ready());
        assert!(!state.is_stuck());
        assert_eq!(
            state,
            AppState::Incomplete {
                texture: Slot::Pending,
                mesh: Slot::Pending,
            }
        );
    }

    #[test]
    fn one_asset_is_not_enough() {
        let state = run(vec![AppEvent::TextureLoaded(Ok(texture()))]);
        assert!(matches!(
            state,
            AppState::Incomplete {
                texture: Slot::Loaded(_),
                mesh: Slot::Pending,
            }
        ));

        let state = run(vec![AppEvent::MeshLoaded(Ok(bundle(1)))]);
        assert!(matches!(
            state,
            AppState::Incomplete {
                texture: Slot::Pending,
                mesh: Slot::Loaded(_),
            }
        ));
    }

    #[test]
    fn merge_is_order_insensitive() {
        let a = run(vec![
            AppEvent::MeshLoaded(Ok(bundle(2))),
            AppEvent::TextureLoaded(Ok(texture())),
        ]);
        let b = run(vec![
            AppEvent::TextureLoaded(Ok(texture())),
            AppEvent::MeshLoaded(Ok(bundle(2))),
        ]);
        assert!(a.is_ready());
        assert_eq!(a, b);
    }

    #[test]
    fn failure_is_terminal() {
        let sequences = vec![
            vec![
                AppEvent::TextureLoaded(Err(failure())),
                AppEvent::MeshLoaded(Ok(bundle(1))),
                AppEvent::TextureLoaded(Ok(texture())),
            ],
            vec![
                AppEvent::MeshLoaded(Ok(bundle(1))),
                AppEvent::MeshLoaded(Err(failure())),
                AppEvent::TextureLoaded(Err(failure())),
                AppEvent::TextureLoaded(Ok(texture())),
            ],
            vec![
                AppEvent::MeshLoaded(Err(failure())),
                AppEvent::TextureLoaded(Ok(texture())),
                AppEvent::MeshLoaded(Ok(bundle(1))),
                AppEvent::MeshLoaded(Ok(bundle(1))),
            ],
        ];
        for events in sequences {
            let state = run(events);
            assert!(!state.is_ready());
            assert!(state.is_stuck());
        }
    }

    #[test]
    fn ready_ignores_later_events() {
        let ready = run(vec![
            AppEvent::TextureLoaded(Ok(texture())),
            AppEvent::MeshLoaded(Ok(bundle(1))),
        ]);
        let after = ready
            .clone()
            .update(AppEvent::MeshLoaded(Err(failure())))
            .update(AppEvent::MeshLoaded(Ok(bundle(3))));
        assert_eq!(after, ready);
    }

    #[test]
    fn loaded_slot_keeps_first_value() {
        let state = run(vec![
            AppEvent::MeshLoaded(Ok(bundle(1))),
            AppEvent::MeshLoaded(Ok(bundle(4))),
        ]);
        let AppState::Incomplete {
            mesh: Slot::Loaded(mesh),
            ..
        } = state
        else {
            panic!("expected a loaded mesh");
        };
        assert_eq!(mesh.guns.len(), 1);
    }
}
