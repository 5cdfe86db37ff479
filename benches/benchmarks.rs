use chunk_ecs::create_archetype;
use chunk_ecs::prelude::*;
use nalgebra_glm::{Mat4, Vec3};
use criterion::*;

const COUNT: usize = 10000;

#[derive(Default, Copy, Clone, Component)]
struct Transform(Mat4);

#[derive(Default, Copy, Clone, Component)]
struct Translation(Vec3);

#[derive(Default, Copy, Clone, Component)]
struct Rotation(Vec3);

#[derive(Default, Copy, Clone, Component)]
struct Velocity(Vec3);

#[derive(Default, Copy, Clone, Component)]
struct Frozen(u32);

fn populated_store() -> (EntityStore, Vec<Entity>) {
    let mut ecs = EntityStore::new();
    let mut entities = vec![Entity::default(); COUNT];
    let archetype = create_archetype!(ecs, [Transform, Translation, Rotation, Velocity]).unwrap();
    ecs.create_entities(archetype, &mut entities).unwrap();
    (ecs, entities)
}

fn create_entities(c: &mut Criterion) {
    c.bench_function("Create entities", |b| {
        let mut entities = vec![Entity::default(); COUNT];
        b.iter_batched(
            || {
                let mut ecs = EntityStore::new();
                let archetype = create_archetype!(ecs, [Transform, Translation, Rotation, Velocity]).unwrap();
                (ecs, archetype)
            },
            |(mut ecs, archetype)| ecs.create_entities(archetype, &mut entities).unwrap(),
            BatchSize::PerIteration,
        );
    });
}

fn destroy_entities(c: &mut Criterion) {
    c.bench_function("Destroy entities", |b| {
        b.iter_batched(
            populated_store,
            |(mut ecs, entities)| ecs.destroy_entities(&entities).unwrap(),
            BatchSize::PerIteration,
        );
    });
}

fn migrate_entities(c: &mut Criterion) {
    c.bench_function("Add and remove a component", |b| {
        b.iter_batched(
            populated_store,
            |(mut ecs, entities)| {
                for entity in &entities {
                    ecs.add_component(*entity, Frozen(1)).unwrap();
                }
                for entity in &entities {
                    ecs.remove_component::<Frozen>(*entity).unwrap();
                }
            },
            BatchSize::PerIteration,
        );
    });
}

fn iterate_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("Iterate entities");
    group.bench_function("Single-threaded", |b| {
        let (mut ecs, _) = populated_store();

        b.iter(|| {
            ecs.for_each::<(&mut Transform, &mut Translation, &Velocity, &Rotation)>(|(m, t, v, r)| {
                t.0 += v.0;
                m.0 = Mat4::new_translation(&t.0) * Mat4::new_rotation(r.0);
            })
            .unwrap()
        });
    });

    group.bench_function("Multi-threaded", |b| {
        let (mut ecs, _) = populated_store();

        b.iter(|| {
            ecs.par_for_each::<(&mut Transform, &mut Translation, &Velocity, &Rotation)>(|(m, t, v, r)| {
                t.0 += v.0;
                m.0 = Mat4::new_translation(&t.0) * Mat4::new_rotation(r.0);
            })
            .unwrap()
        });
    });

    group.bench_function("Subchunks", |b| {
        let mut archetype = Archetype::new(
            &ArchetypeCreationContext::new()
                .with_component::<Translation>()
                .with_component::<Velocity>(),
        )
        .unwrap();
        for i in 0..COUNT {
            archetype.add_entity(Entity::new(i as u32, 1));
        }

        let ids = [ComponentId::of::<Translation>(), ComponentId::of::<Velocity>()];
        b.iter(|| {
            for mut views in archetype.get_subchunks_mut_by_ids(&ids).unwrap() {
                let (translations, velocities) = views.split_at_mut(1);
                let translations = translations[0].as_mut_slice::<Translation>().unwrap();
                let velocities = velocities[0].as_slice::<Velocity>().unwrap();
                for (t, v) in translations.iter_mut().zip(velocities) {
                    t.0 += v.0;
                }
            }
        });
    });
}

criterion_group!(
    benchmarks,
    create_entities,
    destroy_entities,
    migrate_entities,
    iterate_entities,
);
criterion_main!(benchmarks);
