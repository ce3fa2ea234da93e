use crate::infra::LocalStack;
use clap::Args;
use std::path::PathBuf;
use student_showcase::error::AppError;
use student_showcase::workflows::showcase::{
    CachedListing, Caller, DirectoryView, EmploymentStatus, Notice, NoticeLevel, PhotoRules,
    PhotoUpload, ProfileFields, Role, ShowcaseServices, StatusFilter, Submission,
    SubmittedProfile, UserId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// CSV file of students to publish before the walkthrough
    #[arg(long)]
    pub(crate) seed_students: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let stack = LocalStack::new(
        "http://127.0.0.1:3000/storage",
        "profile-photos",
        PhotoRules::default(),
    );
    let admin_id = UserId("demo-admin".to_string());
    stack.roles.grant(admin_id.clone(), Role::Admin)?;

    println!("Student showcase demo");
    if let Some(path) = args.seed_students.as_deref() {
        let stored = stack.seed_students(path)?;
        println!("Seeded {} students from {}", stored, path.display());
    }

    let services = ShowcaseServices::new(stack.backends());
    let admin = Caller::User(admin_id);

    let ada = services.moderation.submit(SubmittedProfile {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        specialization: "Analytical Engines".to_string(),
        status: EmploymentStatus::Looking,
        description: "Wrote the first published algorithm".to_string(),
        portfolio_link: Some("https://ada.example.com".to_string()),
        profile_photo_url: None,
    })?;
    let grace = services.moderation.submit(SubmittedProfile {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        specialization: "Compilers".to_string(),
        status: EmploymentStatus::Internship,
        description: "Finds bugs in relays".to_string(),
        portfolio_link: None,
        profile_photo_url: None,
    })?;
    println!("\nQueued submissions: {}, {}", ada.id, grace.id);

    let mut queue: CachedListing<Submission> = CachedListing::default();
    refresh_queue(&services, &admin, &mut queue);

    let promotion = services.moderation.approve_by_id(&admin, &ada.id)?;
    print_notice(&Notice::success(format!(
        "{} approved as student {} ({:?})",
        promotion.student.profile.name, promotion.student.id, promotion.stage
    )));

    let first = services.moderation.reject(&admin, &grace.id)?;
    let second = services.moderation.reject(&admin, &grace.id)?;
    print_notice(&Notice::success(format!(
        "{} rejected ({:?}, then {:?} on retry)",
        grace.id, first, second
    )));
    refresh_queue(&services, &admin, &mut queue);

    let anonymous = services.moderation.list_pending(&Caller::Anonymous);
    if let Err(err) = anonymous {
        print_notice(&Notice::error(err.to_string()));
    }

    render_directory(&services.directory.browse(StatusFilter::All)?);
    render_directory(
        &services
            .directory
            .browse(StatusFilter::Only(EmploymentStatus::Looking))?,
    );

    let linus = Caller::User(UserId("linus".to_string()));
    let saved = services.profiles.save(
        &linus,
        ProfileFields {
            name: "Linus".to_string(),
            specialization: "Kernels".to_string(),
            status: EmploymentStatus::Employed,
            description: "Maintains a hobby operating system".to_string(),
            ..ProfileFields::default()
        },
    )?;
    println!(
        "\nSelf-service profile saved for {}",
        saved.student().profile.name
    );
    let photo = services.profiles.upload_photo(
        &linus,
        PhotoUpload {
            file_name: Some("linus.png".to_string()),
            content_type: None,
            bytes: vec![0u8; 2048],
        },
    )?;
    println!("Profile photo available at {}", photo.url);

    let oversized = services.profiles.upload_photo(
        &linus,
        PhotoUpload {
            file_name: Some("huge.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0u8; 6 * 1024 * 1024],
        },
    );
    if let Err(err) = oversized {
        print_notice(&Notice::error(err.to_string()));
    }

    Ok(())
}

fn refresh_queue(
    services: &ShowcaseServices,
    admin: &Caller,
    queue: &mut CachedListing<Submission>,
) {
    if let Some(notice) = queue.apply(services.moderation.list_pending(admin)) {
        print_notice(&notice);
    }
    println!("\nPending submissions ({})", queue.items().len());
    for submission in queue.items() {
        println!(
            "- {} | {} | {}",
            submission.id, submission.profile.name, submission.profile.email
        );
    }
}

fn render_directory(view: &DirectoryView) {
    println!(
        "\nDirectory [{}]: {} of {} students (employed {}, internship {}, looking {})",
        view.filter,
        view.students.len(),
        view.total,
        view.counts.employed,
        view.counts.internship,
        view.counts.looking
    );
    for card in &view.students {
        println!("- {} | {} | {}", card.name, card.specialization, card.status_label);
    }
}

fn print_notice(notice: &Notice) {
    let prefix = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    println!("[{prefix}] {}", notice.message);
}
