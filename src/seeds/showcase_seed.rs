use crate::database::{Entity, Filter, Repository};
use crate::models::{CarouselImage, Icon};
use crate::state::AppState;

/// Default home carousel, in display order.
const CAROUSEL_URLS: [&str; 10] = [
    "https://media.istockphoto.com/id/525409405/photo/rear-view-of-teenage-students-raising-hands-in-classroom.jpg?s=612x612&w=0&k=20&c=iae_uTM77vK3N1J6q0Zi7kvfOTjlirp2P5MIVswbxmo=",
    "https://media.istockphoto.com/id/1353890525/photo/young-man-is-working-on-laptop.jpg?s=612x612&w=0&k=20&c=CeU7BOpOoom1841CoZ3i8tFtalQdUi-nBzlLSFMrxR4=",
    "https://media.istockphoto.com/id/1358014313/photo/group-of-elementary-students-having-computer-class-with-their-teacher-in-the-classroom.jpg?s=612x612&w=0&k=20&c=3xsykmHXFa9ejL_sP2Xxiow7zdtmKvg15UxXFfgR98Q=",
    "https://media.istockphoto.com/id/525409577/photo/elevated-view-of-students-writing-their-gcse-exam.jpg?s=612x612&w=0&k=20&c=GYrsKdAtBjK0q2wjkIq8PVOW1wz0c9Qr8KjA6o-R1v0=",
    "https://media.istockphoto.com/id/1468140092/photo/happy-elementary-students-raising-their-hands-on-a-class-at-school.jpg?s=612x612&w=0&k=20&c=BrkqxwR_nW4WzbDCAmpQEyF-QYvML9EktH4hhCj-76U=",
    "https://media.istockphoto.com/id/1401178943/photo/young-lady-using-a-laptop-to-do-research-on-the-internet-woman-working-on-a-project-mixed.jpg?s=612x612&w=0&k=20&c=pptIVFV4VH21H1wict2VTWg2xvb8ykmsmddxiV3iPog=",
    "https://media.istockphoto.com/id/1425235236/photo/side-view-of-youthful-african-american-schoolboy-working-in-front-of-laptop.jpg?s=612x612&w=0&k=20&c=-mIYq_YHruqvNr5DZ4GMf7BrwKNug3M3U_JwLnIxvLU=",
    "https://media.istockphoto.com/id/1278975233/photo/high-school-students-doing-exam-in-classroom.jpg?s=612x612&w=0&k=20&c=YxR9rTScBny8zJuZchXhKx08jxpP354Rv4XD6q-0xS8=",
    "https://media.istockphoto.com/id/1307457391/photo/happy-black-student-raising-arm-to-answer-question-while-attending-class-with-her-university.jpg?s=612x612&w=0&k=20&c=iZaZFyC-WqlqSQc4elqUNPTxLvWPe8P5Tb_YdZnrI9Q=",
    "https://media.istockphoto.com/id/1446488662/photo/group-work-of-school-children-students-discuss-a-collective-project-at-school.jpg?s=612x612&w=0&k=20&c=TcK_54lNHDS8i3kOI00hiXjz8_ZD9r7_Y9sV-Hz8pHU=",
];

const ICON_IMAGE: &str = "https://imgs.search.brave.com/QS7NoATo7Ox7h8HzSYMvN-A6_0j20ptTBSlE3184HZE/rs:fit:500:0:0:0/g:ce/aHR0cHM6Ly9pbWdz/LnNlYXJjaC5icmF2/ZS5jb20vMTRROE01/WjhkdHpGbUZxVi1Y/d1I5M3M1LVA5SlBW/RHBwWmtEc1Z5UkZf/TS9yczpmaXQ6NTYw/OjMyMDoxOjAvZzpj/ZS9hSFIwY0hNNkx5/OWpaRzR1L2MyaHZj/R2xtZVM1amIyMHYv/Y3k5bWFXeGxjeTh4/THpBdy9OekF2TnpB/ek1pOWhjblJwL1ky/eGxjeTl0YjNScGRt/RjAvYVc5dVlXeGZN/akJ4ZFc5MC9aWE5m/WmpSallXTTVOR010/L1pXWTFaQzAwWkRG/a0xUbGwvWkdZdE1U/SmlOREE1TnpWay9a/R1EwTG5CdVp6OTJQ/VEUzL01qa3lOemcx/TWpVbWIzSnAvWjJs/dVlXeFhhV1IwYUQw/eC9PRFE0Sm05eWFX/ZHBibUZzL1NHVnBa/MmgwUFRjNE1n.jpeg";

/// Default quick-link icons, in display order.
const ICON_LABELS: [&str; 5] = [
    "Motivational Quotes",
    "College Details",
    "Course Details",
    "Job Opening",
    "Course Benifits",
];

fn default_carousel() -> Vec<CarouselImage> {
    CAROUSEL_URLS
        .iter()
        .enumerate()
        .map(|(i, url)| CarouselImage::new((i + 1).to_string(), url.to_string()))
        .collect()
}

fn default_icons() -> Vec<Icon> {
    ICON_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| Icon::new((i + 1).to_string(), ICON_IMAGE.to_string(), label.to_string()))
        .collect()
}

/// Inserts `items` only when the collection is still empty.
async fn seed_if_empty<T: Entity>(repo: &Repository<T>, items: Vec<T>) {
    match repo.count(&Filter::All).await {
        Ok(0) => {}
        Ok(count) => {
            log::info!("📋 {}: {} already in DB, skipping seed", T::COLLECTION, count);
            return;
        }
        Err(e) => {
            log::error!("   ❌ Failed to count {}: {}", T::COLLECTION, e);
            return;
        }
    }

    log::info!("📋 {}: seeding {} defaults...", T::COLLECTION, items.len());
    let mut inserted = 0;
    for item in &items {
        match repo.create(item).await {
            Ok(()) => inserted += 1,
            Err(e) => log::error!("   ❌ Failed to seed {} {}: {}", T::LABEL, item.id(), e),
        }
    }
    log::info!("   ✅ Inserted {} documents into {}", inserted, T::COLLECTION);
}

/// Seeds the public home-screen content.
pub async fn seed_showcase(state: &AppState) {
    seed_if_empty(&state.repo::<CarouselImage>(), default_carousel()).await;
    seed_if_empty(&state.repo::<Icon>(), default_icons()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::FindOptions;

    #[tokio::test]
    async fn seeds_once_into_empty_collections() {
        let state = AppState::in_memory(&AppConfig::for_tests()).await;
        seed_showcase(&state).await;
        seed_showcase(&state).await;

        let images = state.repo::<CarouselImage>();
        assert_eq!(images.count(&Filter::All).await.unwrap(), CAROUSEL_URLS.len() as u64);
        let icons = state.repo::<Icon>().find(&Filter::All, &FindOptions::default()).await.unwrap();
        assert_eq!(icons.len(), ICON_LABELS.len());
        assert!(icons.iter().any(|icon| icon.id == "1" && icon.label == "Motivational Quotes"));
    }

    #[tokio::test]
    async fn existing_content_is_left_alone() {
        let state = AppState::in_memory(&AppConfig::for_tests()).await;
        let images = state.repo::<CarouselImage>();
        images.create(&CarouselImage::new("1".into(), "https://example.com/a.png".into())).await.unwrap();

        seed_showcase(&state).await;
        assert_eq!(images.count(&Filter::All).await.unwrap(), 1);
    }
}
