//! Starter layouts: the blank layout for a new project, the demo seed, and the
//! named templates a project can be created from.

use serde::Serialize;

use crate::layout::model::{ProjectType, Section, SectionContent, SectionType};
use crate::store::NewProject;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub description: &'static str,
    pub layout: Vec<Section>,
}

fn text(id: &str, section_type: SectionType, title: &str, content: &str, order: u32) -> Section {
    Section::new(id, section_type, Some(title), SectionContent::from(content), order)
}

fn list(id: &str, title: &str, items: &[&str], order: u32) -> Section {
    let items = items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Section::new(id, SectionType::Skills, Some(title), SectionContent::from(items), order)
}

/// Layout given to a project created without a template.
pub fn default_layout(project_type: ProjectType) -> Vec<Section> {
    match project_type {
        ProjectType::Resume => vec![
            text("header-1", SectionType::Header, "Your Name", "Professional Title", 0),
            text(
                "contact-1",
                SectionType::Contact,
                "Contact Information",
                "your.email@example.com | (555) 123-4567",
                1,
            ),
            text(
                "section-1",
                SectionType::Section,
                "Professional Summary",
                "Brief professional summary highlighting your key qualifications and experience.",
                2,
            ),
        ],
        ProjectType::CoverLetter => vec![
            text("header-1", SectionType::Header, "Cover Letter", "Your Name", 0),
            text(
                "text-1",
                SectionType::Text,
                "Introduction",
                "Dear Hiring Manager,\n\nI am writing to express my interest in the [Position Title] position at [Company Name].",
                1,
            ),
        ],
    }
}

/// The sample project seeded for the demo user.
pub fn demo_project() -> NewProject {
    NewProject {
        title: "My Resume".to_string(),
        project_type: ProjectType::Resume,
        layout: vec![
            text("header-1", SectionType::Header, "John Doe", "Software Developer", 0),
            text(
                "contact-1",
                SectionType::Contact,
                "Contact Information",
                "john.doe@email.com | (555) 123-4567 | LinkedIn: linkedin.com/in/johndoe",
                1,
            ),
            text(
                "section-1",
                SectionType::Section,
                "Professional Summary",
                "Experienced software developer with 5+ years in web development, specializing in React and Node.js.",
                2,
            ),
        ],
    }
}

pub fn templates() -> Vec<Template> {
    vec![
        Template {
            id: "modern-resume",
            title: "Modern Professional",
            project_type: ProjectType::Resume,
            description: "Clean and modern design perfect for tech and business professionals",
            layout: vec![
                text("header-1", SectionType::Header, "Your Name", "Professional Title", 0),
                text(
                    "contact-1",
                    SectionType::Contact,
                    "Contact Information",
                    "your.email@example.com | (555) 123-4567 | LinkedIn: linkedin.com/in/yourname",
                    1,
                ),
                text(
                    "section-1",
                    SectionType::Section,
                    "Professional Summary",
                    "Results-driven professional with expertise in [your field]. Proven track record of success.",
                    2,
                ),
                text(
                    "experience-1",
                    SectionType::Experience,
                    "Professional Experience",
                    "Senior Position | Company Name | 2020 - Present\n• Key achievement or responsibility\n• Another significant accomplishment\n• Third important contribution",
                    3,
                ),
                list(
                    "skills-1",
                    "Core Competencies",
                    &[
                        "Leadership",
                        "Project Management",
                        "Strategic Planning",
                        "Data Analysis",
                        "Communication",
                        "Problem Solving",
                    ],
                    4,
                ),
                text(
                    "education-1",
                    SectionType::Education,
                    "Education",
                    "Degree in Field of Study\nUniversity Name | Graduation Year",
                    5,
                ),
            ],
        },
        Template {
            id: "creative-resume",
            title: "Creative Professional",
            project_type: ProjectType::Resume,
            description: "Eye-catching design for creative industries and portfolio-based roles",
            layout: vec![
                text(
                    "header-1",
                    SectionType::Header,
                    "Your Creative Name",
                    "Creative Professional | Designer | Innovator",
                    0,
                ),
                text(
                    "contact-1",
                    SectionType::Contact,
                    "Get in Touch",
                    "hello@yourname.com | (555) 123-4567 | Portfolio: yourname.com",
                    1,
                ),
                text(
                    "section-1",
                    SectionType::Section,
                    "Creative Vision",
                    "Passionate creative professional bringing innovative ideas to life. Specialized in visual storytelling.",
                    2,
                ),
                text(
                    "experience-1",
                    SectionType::Experience,
                    "Creative Experience",
                    "Senior Designer | Creative Agency | 2019 - Present\n• Led creative campaigns with measurable results\n• Collaborated with cross-functional teams\n• Managed projects from concept to completion",
                    3,
                ),
                list(
                    "skills-1",
                    "Creative Skills & Tools",
                    &[
                        "Adobe Creative Suite",
                        "UI/UX Design",
                        "Brand Development",
                        "Typography",
                        "Creative Strategy",
                        "Visual Storytelling",
                    ],
                    4,
                ),
            ],
        },
        Template {
            id: "entry-level-resume",
            title: "Entry Level Professional",
            project_type: ProjectType::Resume,
            description: "Perfect for recent graduates and early-career professionals",
            layout: vec![
                text(
                    "header-1",
                    SectionType::Header,
                    "Your Name",
                    "Recent Graduate | Aspiring Professional",
                    0,
                ),
                text(
                    "contact-1",
                    SectionType::Contact,
                    "Contact Details",
                    "your.email@example.com | (555) 123-4567 | LinkedIn: linkedin.com/in/yourname",
                    1,
                ),
                text(
                    "section-1",
                    SectionType::Section,
                    "Professional Objective",
                    "Motivated graduate seeking an entry-level position to apply academic knowledge and develop professional skills.",
                    2,
                ),
                text(
                    "education-1",
                    SectionType::Education,
                    "Education",
                    "Bachelor of [Major]\nUniversity Name | Graduation Year\nRelevant Coursework: Course 1, Course 2, Course 3",
                    3,
                ),
                text(
                    "experience-1",
                    SectionType::Experience,
                    "Experience & Internships",
                    "Internship Title | Company | Dates\n• Gained hands-on experience in relevant field\n• Contributed to team projects and initiatives\n• Developed practical skills and knowledge",
                    4,
                ),
                list(
                    "skills-1",
                    "Technical & Soft Skills",
                    &[
                        "Microsoft Office",
                        "Data Analysis",
                        "Research",
                        "Team Collaboration",
                        "Communication",
                        "Time Management",
                    ],
                    5,
                ),
            ],
        },
        Template {
            id: "professional-cover-letter",
            title: "Professional Standard",
            project_type: ProjectType::CoverLetter,
            description: "Classic, professional cover letter format suitable for most industries",
            layout: vec![
                text("header-1", SectionType::Header, "Your Name", "Professional Title", 0),
                text(
                    "contact-1",
                    SectionType::Contact,
                    "Contact Information",
                    "your.email@example.com | (555) 123-4567\n[Date]\n\n[Hiring Manager Name]\n[Company Name]\n[Company Address]",
                    1,
                ),
                text(
                    "text-1",
                    SectionType::Text,
                    "Opening",
                    "Dear [Hiring Manager Name],\n\nI am writing to express my strong interest in the [Position Title] role at [Company Name]. With my experience in [relevant field], I am excited about the opportunity to contribute to your team.",
                    2,
                ),
                text(
                    "text-2",
                    SectionType::Text,
                    "Body Paragraph",
                    "In my current role as [Current Position], I have successfully [specific achievement]. This experience has strengthened my expertise in [relevant skills] and I believe my background aligns perfectly with your needs.",
                    3,
                ),
                text(
                    "text-3",
                    SectionType::Text,
                    "Closing",
                    "Thank you for considering my application. I would welcome the opportunity to discuss how my experience can contribute to [Company Name]. I look forward to hearing from you.\n\nSincerely,\n[Your Name]",
                    4,
                ),
            ],
        },
    ]
}

pub fn find_template(id: &str) -> Option<Template> {
    templates().into_iter().find(|t| t.id == id)
}
